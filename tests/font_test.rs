use std::io::Cursor;

use byteorder::{BigEndian, WriteBytesExt};
use pretty_assertions::assert_eq;
use sfnt_meta::{
    CmapSubtable, Font, FontError, Tag,
    tables::{SfntVersion, head::IndexToLocFormat},
};

fn head_table() -> Vec<u8> {
    let mut data = Vec::new();
    data.write_u32::<BigEndian>(0x0001_0000).unwrap();
    data.write_u32::<BigEndian>(0x0001_8000).unwrap();
    data.write_u32::<BigEndian>(0).unwrap();
    data.write_u32::<BigEndian>(0x5F0F_3CF5).unwrap();
    data.write_u16::<BigEndian>(0x000B).unwrap();
    data.write_u16::<BigEndian>(2048).unwrap();
    data.write_i64::<BigEndian>(3_000_000_000).unwrap();
    data.write_i64::<BigEndian>(3_100_000_000).unwrap();
    for extent in [-200i16, -400, 2200, 1900] {
        data.write_i16::<BigEndian>(extent).unwrap();
    }
    data.write_u16::<BigEndian>(0).unwrap();
    data.write_u16::<BigEndian>(9).unwrap();
    data.write_i16::<BigEndian>(2).unwrap();
    data.write_i16::<BigEndian>(0).unwrap();
    data.write_i16::<BigEndian>(0).unwrap();
    data
}

/// A cmap with a format 4, an unknown format 255 and a format 0 subtable
fn cmap_table() -> Vec<u8> {
    let mut format4 = Vec::new();
    format4.write_u16::<BigEndian>(4).unwrap();
    format4.write_u16::<BigEndian>(32).unwrap();
    format4.write_u16::<BigEndian>(0).unwrap();
    format4.write_u16::<BigEndian>(4).unwrap(); // two segments
    format4.write_u16::<BigEndian>(4).unwrap();
    format4.write_u16::<BigEndian>(1).unwrap();
    format4.write_u16::<BigEndian>(0).unwrap();
    for value in [0x7Au16, 0xFFFF, 0, 0x61, 0xFFFF] {
        format4.write_u16::<BigEndian>(value).unwrap();
    }
    for delta in [-0x5Ei16, 1] {
        format4.write_i16::<BigEndian>(delta).unwrap();
    }
    for range_offset in [0u16, 0] {
        format4.write_u16::<BigEndian>(range_offset).unwrap();
    }
    assert_eq!(format4.len(), 32);

    let unknown = [0x00, 0xFF, 0x00, 0x06, 0x00, 0x00];

    let mut format0 = Vec::new();
    format0.write_u16::<BigEndian>(0).unwrap();
    format0.write_u16::<BigEndian>(262).unwrap();
    format0.write_u16::<BigEndian>(0).unwrap();
    let mut glyphs = [0u8; 256];
    glyphs[65] = 36;
    format0.extend_from_slice(&glyphs);

    let bodies: [&[u8]; 3] = [&format4, &unknown, &format0];
    let ids = [(3u16, 1u16), (0, 5), (1, 0)];

    let mut data = Vec::new();
    data.write_u16::<BigEndian>(0).unwrap();
    data.write_u16::<BigEndian>(3).unwrap();
    let mut offset = 4 + 3 * 8;
    for ((platform_id, encoding_id), body) in ids.iter().zip(bodies) {
        data.write_u16::<BigEndian>(*platform_id).unwrap();
        data.write_u16::<BigEndian>(*encoding_id).unwrap();
        data.write_u32::<BigEndian>(offset).unwrap();
        offset += body.len() as u32;
    }
    for body in bodies {
        data.extend_from_slice(body);
    }
    data
}

/// Lays out a font with the given tables, records sorted by tag
fn font_bytes(tables: &[(Tag, Vec<u8>)]) -> Vec<u8> {
    let num_tables = tables.len() as u16;
    let mut data = Vec::new();
    data.write_u32::<BigEndian>(0x0001_0000).unwrap();
    data.write_u16::<BigEndian>(num_tables).unwrap();
    data.write_u16::<BigEndian>(32).unwrap();
    data.write_u16::<BigEndian>(1).unwrap();
    data.write_u16::<BigEndian>(0).unwrap();

    let mut offset = 12 + 16 * tables.len() as u32;
    for (tag, body) in tables {
        data.extend_from_slice(tag.as_bytes());
        data.write_u32::<BigEndian>(0).unwrap();
        data.write_u32::<BigEndian>(offset).unwrap();
        data.write_u32::<BigEndian>(body.len() as u32).unwrap();
        // keep tables 4-byte aligned
        offset += (body.len() as u32 + 3) & !3;
    }
    for (_, body) in tables {
        data.extend_from_slice(body);
        data.resize((data.len() + 3) & !3, 0);
    }
    data
}

#[test]
fn decodes_directory_head_and_cmap() {
    let data = font_bytes(&[(Tag::CMAP, cmap_table()), (Tag::HEAD, head_table())]);
    let font = Font::from_bytes(&data).unwrap();

    let directory = font.directory();
    assert_eq!(directory.offset.sfnt_version(), SfntVersion::TrueType);
    assert_eq!(
        directory.iter().map(|record| record.tag).collect::<Vec<_>>(),
        vec![Tag::CMAP, Tag::HEAD]
    );

    let head = font.head().unwrap();
    assert_eq!(head.units_per_em, 2048);
    assert_eq!(head.font_revision.to_f64(), 1.5);
    assert_eq!(head.loca_format(), Some(IndexToLocFormat::Short));
    assert_eq!((head.x_min, head.y_min, head.x_max, head.y_max), (-200, -400, 2200, 1900));

    let cmap = font.cmap().unwrap();
    assert_eq!(cmap.records.len(), 3);

    let results = cmap.subtables().collect::<Vec<_>>();
    let windows = results[0].1.as_ref().unwrap();
    assert_eq!(windows.format(), 4);
    assert_eq!(windows.glyph_index(u32::from('a')), Some(3));
    assert_eq!(windows.glyph_index(u32::from('z')), Some(28));
    assert_eq!(windows.glyph_index(u32::from('A')), None);

    assert!(matches!(results[1].1, Err(FontError::UnsupportedFormat(255))));

    let mac = results[2].1.as_ref().unwrap();
    assert!(matches!(mac, CmapSubtable::Format0(_)));
    assert_eq!(mac.glyph_index(u32::from('A')), Some(36));

    // 0/5 only holds variation sequences, so the Windows BMP map is chosen
    let preferred = cmap.find_unicode_record().unwrap();
    assert_eq!((preferred.platform_id, preferred.platform_specific_id), (3, 1));
    assert_eq!(cmap.glyph_index(u32::from('z')), Some(28));
    assert_eq!(cmap.glyph_index(u32::from('A')), None);
}

#[test]
fn directory_round_trips() {
    let data = font_bytes(&[(Tag::CMAP, cmap_table()), (Tag::HEAD, head_table())]);
    let font = Font::from_bytes(&data).unwrap();

    let mut encoded = Vec::new();
    font.directory().write(&mut encoded).unwrap();
    assert_eq!(encoded, &data[..12 + 2 * 16]);
}

#[test]
fn missing_tables_are_reported() {
    let data = font_bytes(&[(Tag::HEAD, head_table())]);
    let font = Font::from_bytes(&data).unwrap();

    assert!(font.head().is_ok());
    assert!(font.table_data(Tag::CMAP).is_none());
    match font.cmap() {
        Err(FontError::MissingTable(tag)) => assert_eq!(tag, Tag::CMAP),
        other => panic!("expected a missing cmap, got {other:?}"),
    }
}

#[test]
fn truncated_head_does_not_affect_cmap() {
    let mut head = head_table();
    head.truncate(40);
    let data = font_bytes(&[(Tag::CMAP, cmap_table()), (Tag::HEAD, head)]);
    let font = Font::from_bytes(&data).unwrap();

    assert!(matches!(font.head(), Err(FontError::TruncatedInput { .. })));
    let cmap = font.cmap().unwrap();
    let record = cmap.find_record(1, 0).unwrap();
    assert_eq!(cmap.subtable(record).unwrap().glyph_index(65), Some(36));
}

#[test]
fn loads_from_a_reader() {
    let data = font_bytes(&[(Tag::HEAD, head_table())]);
    let loaded = sfnt_meta::load_font(Cursor::new(data.clone())).unwrap();

    assert_eq!(loaded, data);
    assert_eq!(Font::from_bytes(&loaded).unwrap().directory().len(), 1);
}

#[test]
fn fonts_are_shareable_between_threads() {
    let data = font_bytes(&[(Tag::CMAP, cmap_table()), (Tag::HEAD, head_table())]);
    let font = Font::from_bytes(&data).unwrap();

    std::thread::scope(|scope| {
        let handles = (0..4)
            .map(|_| {
                scope.spawn(|| {
                    let cmap = font.cmap().unwrap();
                    let record = cmap.find_record(3, 1).unwrap();
                    cmap.subtable(record).unwrap().glyph_index(u32::from('b'))
                })
            })
            .collect::<Vec<_>>();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), Some(4));
        }
    });
}
