// SPDX-License-Identifier: MIT

include!(concat!(env!("OUT_DIR"), "/test-report-descriptors.rs"));

fn datafile(name: &str) -> DeviceDescriptor {
    let path = format!("{}/tests/data/{name}", env!("CARGO_MANIFEST_DIR"));
    let bytes = std::fs::read(&path).unwrap();
    DeviceDescriptor::try_from(&bytes).unwrap()
}

/// Checks the counts and cross references of a parsed tree.
fn check_tree(rdesc: &DeviceDescriptor) {
    let root = rdesc.root();
    assert!(root.is_root());
    assert_eq!(root.num_elements(), rdesc.fields().len());
    assert_eq!(root.num_collections(), rdesc.collections().len() - 1);

    for (n, field) in rdesc.fields().iter().enumerate() {
        assert_eq!(field.index, FieldIndex(n));
        let c = rdesc.collection(field.collection).unwrap();
        assert!(c.fields().contains(&field.index));
        assert!((1..=32).contains(&field.report_size.0));
    }

    for c in rdesc.collections() {
        let nested: usize = c
            .children()
            .iter()
            .map(|idx| rdesc.collection(*idx).unwrap())
            .map(|child| {
                assert_eq!(child.parent(), Some(c.index()));
                child.num_elements()
            })
            .sum();
        assert_eq!(c.num_elements(), c.fields().len() + nested);

        let nested: usize = c
            .children()
            .iter()
            .map(|idx| rdesc.collection(*idx).unwrap().num_collections())
            .sum();
        assert_eq!(c.num_collections(), c.children().len() + nested);
    }

    for id in rdesc.report_ids() {
        let bits: usize = rdesc
            .fields_for(IoKind::Output, id)
            .map(|f| f.report_size.0)
            .sum();
        assert_eq!(rdesc.reports().output_bits(id), Some(bits));
    }
}

#[test]
fn mouse_wheel_pan() {
    let mut rdesc = datafile("mouse-wheel-pan.hid.bin");
    assert_eq!(rdesc.fields().len(), 10);
    assert_eq!(rdesc.root().num_collections(), 2);

    let pan = &rdesc.fields()[9];
    assert_eq!(pan.usage_page, UsagePage(0x0c));
    assert_eq!(pan.usage, UsageId(0x238));
    assert_eq!(pan.logical_minimum, LogicalMinimum(-127));

    // button 2, X = -2, Y = 300, wheel = 1, pan = -1
    #[rustfmt::skip]
    let report = [
        0b0000_0010,
        0xfe, 0xff,
        0x2c, 0x01,
        0x01,
        0xff,
    ];
    let mut changed = vec![];
    rdesc
        .decode(&report, |f| changed.push((f.usage, f.value())))
        .unwrap();
    assert_eq!(
        changed,
        vec![
            (UsageId(0x02), 1),
            (UsageId(0x30), -2),
            (UsageId(0x31), 300),
            (UsageId(0x38), 1),
            (UsageId(0x238), -1),
        ]
    );
}

#[test]
fn keyboard_boot() {
    let mut rdesc = datafile("keyboard-boot.hid.bin");
    assert_eq!(rdesc.fields().len(), 21);
    assert_eq!(rdesc.output_report_len(ReportId(0)), Some(2));

    let keys: Vec<&Field> = rdesc.fields().iter().skip(15).collect();
    assert!(keys.iter().all(|f| f.is_array()));
    assert!(keys
        .iter()
        .all(|f| f.usage_maximum == Some(UsageMaximum(0xff))));

    rdesc
        .decode(&[0x00, 0x00, 0x04, 0x05, 0x00, 0x00, 0x00, 0x00], |_| {})
        .unwrap();
    assert_eq!(rdesc.fields()[15].usage, UsageId(0x04));
    assert_eq!(rdesc.fields()[16].usage, UsageId(0x05));
    assert_eq!(rdesc.fields()[16].array_value(), 0x05);

    // Num Lock and Scroll Lock
    rdesc.field_mut(FieldIndex(9)).unwrap().set_value(1);
    let report = rdesc.set_output_value(FieldIndex(11), 1).unwrap();
    assert_eq!(report, vec![0x00, 0b0000_0101]);
}

#[test]
fn gamepad_report_ids() {
    let mut rdesc = datafile("gamepad-report-ids.hid.bin");
    assert!(rdesc.uses_report_ids());
    assert_eq!(rdesc.report_ids(), vec![ReportId(1), ReportId(2), ReportId(3)]);
    assert_eq!(rdesc.fields_of(IoKind::Input).count(), 22);
    assert_eq!(rdesc.fields_of(IoKind::Output).count(), 4);
    assert_eq!(rdesc.fields_of(IoKind::Feature).count(), 7);
    assert_eq!(rdesc.output_report_len(ReportId(2)), Some(4));
    assert_eq!(rdesc.output_report_len(ReportId(1)), Some(1));

    let physical = rdesc.collection(CollectionIndex(2)).unwrap();
    assert_eq!(physical.kind(), Some(CollectionKind::Physical));
    assert_eq!(physical.num_elements(), 4);
    assert_eq!(physical.usage(), UsageId(0x01));

    let hat = &rdesc.fields()[20];
    assert_eq!(hat.usage, UsageId(0x39));
    assert_eq!(hat.collection, CollectionIndex(1));
    assert_eq!(hat.physical_maximum, PhysicalMaximum(315));
    assert_eq!(hat.unit, Unit(0x14));
    assert!(hat.attributes.has_null_state());

    // Rz at half range, hat pointing east
    #[rustfmt::skip]
    let report = [
        0x01,
        0x00, 0x00,
        0x00, 0x00, 0x00, 0x80,
        0x03,
    ];
    rdesc.decode(&report, |_| {}).unwrap();
    let rz = &rdesc.fields()[19];
    assert_eq!(rz.usage, UsageId(0x35));
    assert_eq!(rz.value(), 0x80);
    assert!((rz.physical_value().unwrap() - 128.0).abs() < 1e-3);
    assert_eq!(rdesc.fields()[20].value(), 3);
    assert!((rdesc.fields()[20].physical_value().unwrap() - 90.0).abs() < 1e-3);

    let report = rdesc.set_output_value(FieldIndex(24), 50).unwrap();
    assert_eq!(report, vec![0x02, 0x00, 0x32, 0x00]);
    let report = rdesc.set_output_value(FieldIndex(22), 1).unwrap();
    assert_eq!(report, vec![0x02, 0x01, 0x32, 0x00]);

    assert!(matches!(
        rdesc.decode(&[0x03, 0, 0, 0, 0, 0, 0, 0], |_| {}),
        Err(ReportError::UnknownReportId(ReportId(3)))
    ));
}

#[test]
fn vendor_extended_usages() {
    let mut rdesc = datafile("vendor-extended-usages.hid.bin");
    assert_eq!(rdesc.fields_of(IoKind::Input).count(), 2);
    assert_eq!(rdesc.fields_of(IoKind::Output).count(), 16);

    let app = rdesc.collection(CollectionIndex(1)).unwrap();
    assert_eq!(app.usage_page(), UsagePage(0xff00));

    let x = &rdesc.fields()[0];
    assert_eq!(x.usage_page, UsagePage(0x01));
    assert_eq!(x.usage, UsageId(0x30));
    assert_eq!(x.logical_minimum, LogicalMinimum(i64::from(i32::MIN)));
    assert_eq!(x.logical_maximum, LogicalMaximum(i64::from(i32::MAX)));
    assert_eq!(x.unit_exponent, UnitExponent(-2));
    assert_eq!(x.report_size, ReportSize(32));

    // Push/Pop are ignored, the Report Size of 8 sticks
    let out = &rdesc.fields()[2];
    assert_eq!(out.usage_page, UsagePage(0xff00));
    assert_eq!(out.report_size, ReportSize(8));
    assert_eq!(rdesc.output_report_len(ReportId(0)), Some(17));

    #[rustfmt::skip]
    let report = [
        0xff, 0xff, 0xff, 0xff,
        0x00, 0x00, 0x00, 0x80,
    ];
    rdesc.decode(&report, |_| {}).unwrap();
    assert_eq!(rdesc.fields()[0].value(), -1);
    assert_eq!(rdesc.fields()[1].value(), i64::from(i32::MIN));
}
