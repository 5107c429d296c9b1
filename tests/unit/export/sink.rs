use std::io::Read as _;

use super::*;

fn read_zip(bytes: Vec<u8>) -> Vec<(String, Vec<u8>)> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    (0..archive.len())
        .map(|i| {
            let mut entry = archive.by_index(i).unwrap();
            let mut data = Vec::new();
            entry.read_to_end(&mut data).unwrap();
            (entry.name().to_string(), data)
        })
        .collect()
}

#[test]
fn zip_keeps_entry_order_and_content() {
    let entries = vec![
        ("b.gif".to_string(), vec![1, 2, 3]),
        ("a.gif".to_string(), vec![4; 100]),
    ];
    let bytes = zip_entries(&entries).unwrap();
    assert_eq!(&bytes[..2], b"PK");
    assert_eq!(read_zip(bytes), entries);
}

#[test]
fn zip_output_is_stable() {
    let entries = vec![("x.webp".to_string(), vec![9; 32])];
    assert_eq!(zip_entries(&entries).unwrap(), zip_entries(&entries).unwrap());
}

#[test]
fn in_memory_sink_records_saves_and_archives() {
    let mut sink = InMemorySink::new();
    let archive = pollster::block_on(sink.archive(vec![("one".to_string(), vec![1])])).unwrap();
    pollster::block_on(sink.save(archive, "bundle.zip")).unwrap();
    assert_eq!(sink.archived(), &[vec!["one".to_string()]]);
    assert_eq!(sink.saved()[0].0, "bundle.zip");
}

#[test]
fn directory_sink_writes_files() {
    let dir = std::env::temp_dir().join(format!("smtx-sink-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    let mut sink = DirectorySink::new(&dir);
    pollster::block_on(sink.save(vec![7, 7], "out.gif")).unwrap();
    assert_eq!(std::fs::read(dir.join("out.gif")).unwrap(), vec![7, 7]);
    assert_eq!(sink.written(), &[dir.join("out.gif")]);

    let err = pollster::block_on(sink.save(vec![], "../escape.gif")).unwrap_err();
    assert!(matches!(err, SmtxError::Validation(_)));
    let _ = std::fs::remove_dir_all(&dir);
}
