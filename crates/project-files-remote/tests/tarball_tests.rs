use flate2::Compression;
use flate2::write::GzEncoder;
use project_files::{Archive, ArchiveDecoder, DecodeError};
use project_files_remote::{AutoDecoder, TarGzDecoder};

/// Build a .tar.gz in memory with the given files.
/// Each entry is (path_in_tar, content).
fn build_tarball(entries: &[(&str, &str)]) -> Vec<u8> {
    let gz_buf = Vec::new();
    let encoder = GzEncoder::new(gz_buf, Compression::default());
    let mut archive = tar::Builder::new(encoder);

    for (file_path, content) in entries {
        let data = content.as_bytes();
        let mut header = tar::Header::new_gnu();
        header.set_path(file_path).unwrap();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_entry_type(tar::EntryType::Regular);
        header.set_cksum();
        archive.append(&header, data).unwrap();
    }

    let encoder = archive.into_inner().unwrap();
    encoder.finish().unwrap()
}

fn append_dir(archive: &mut tar::Builder<GzEncoder<Vec<u8>>>, path: &str) {
    let mut header = tar::Header::new_gnu();
    header.set_path(path).unwrap();
    header.set_size(0);
    header.set_mode(0o755);
    header.set_entry_type(tar::EntryType::Directory);
    header.set_cksum();
    archive.append(&header, std::io::empty()).unwrap();
}

#[tokio::test]
async fn extracts_files_from_tarball() {
    let bytes = build_tarball(&[
        ("projects/01/Not.hdl", "CHIP Not {}"),
        ("projects/05/CPU.hdl", "CHIP CPU {}"),
    ]);

    let mut archive = TarGzDecoder.decode(bytes).unwrap();
    let entries = archive.entries().to_vec();

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].relative_path, "projects/01/Not.hdl");
    assert_eq!(entries[1].relative_path, "projects/05/CPU.hdl");
    assert_eq!(archive.read_text(&entries[1]).await.unwrap(), "CHIP CPU {}");
}

#[tokio::test]
async fn directory_entries_are_flagged() {
    let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
    append_dir(&mut builder, "projects/01/");
    let data = b"CHIP Not {}";
    let mut header = tar::Header::new_gnu();
    header.set_path("projects/01/Not.hdl").unwrap();
    header.set_size(data.len() as u64);
    header.set_mode(0o644);
    header.set_entry_type(tar::EntryType::Regular);
    header.set_cksum();
    builder.append(&header, &data[..]).unwrap();
    let bytes = builder.into_inner().unwrap().finish().unwrap();

    let archive = TarGzDecoder.decode(bytes).unwrap();
    let entries = archive.entries();

    assert_eq!(entries.len(), 2);
    assert!(entries[0].is_dir);
    assert!(!entries[1].is_dir);
}

#[tokio::test]
async fn preserves_file_content() {
    let content =
        "// This file is part of www.nand2tetris.org\nload Not.hdl,\noutput-file Not.out,\n";
    let bytes = build_tarball(&[("projects/01/Not.tst", content)]);

    let mut archive = TarGzDecoder.decode(bytes).unwrap();
    let entry = archive.entries()[0].clone();

    assert_eq!(archive.read_text(&entry).await.unwrap(), content);
}

#[test]
fn garbage_after_gzip_magic_is_corrupt() {
    let result = TarGzDecoder.decode(vec![0x1F, 0x8B, 0x00, 0x01, 0x02]);
    assert!(matches!(result, Err(DecodeError::Corrupt(_))));
}

#[test]
fn auto_decoder_detects_tarball() {
    let bytes = build_tarball(&[("projects/01/Not.hdl", "x")]);

    let archive = AutoDecoder.decode(bytes).unwrap();
    assert_eq!(archive.entries().len(), 1);
}

/// Append a regular file whose name is written into the header verbatim,
/// bypassing the builder's own path checks.
fn append_raw_name(archive: &mut tar::Builder<GzEncoder<Vec<u8>>>, name: &str, data: &[u8]) {
    let mut header = tar::Header::new_old();
    header.as_old_mut().name[..name.len()]
        .copy_from_slice(name.as_bytes());
    header.set_size(data.len() as u64);
    header.set_mode(0o644);
    header.set_entry_type(tar::EntryType::Regular);
    header.set_cksum();
    archive.append(&header, data).unwrap();
}

#[test]
fn unsafe_entry_path_is_rejected() {
    let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
    append_raw_name(&mut builder, "projects/01/Not.hdl", b"CHIP Not {}");
    append_raw_name(&mut builder, "projects/../../evil.hdl", b"pwned");
    let bytes = builder.into_inner().unwrap().finish().unwrap();

    let result = TarGzDecoder.decode(bytes);
    assert!(matches!(result, Err(DecodeError::UnsafePath(p)) if p.contains("evil.hdl")));
}

#[test]
fn symlinks_are_not_enumerated() {
    let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));

    let mut link = tar::Header::new_gnu();
    link.set_path("projects/01/Link.hdl").unwrap();
    link.set_size(0);
    link.set_mode(0o777);
    link.set_entry_type(tar::EntryType::Symlink);
    link.set_link_name("Not.hdl").unwrap();
    link.set_cksum();
    builder.append(&link, std::io::empty()).unwrap();

    append_raw_name(&mut builder, "projects/01/Not.hdl", b"CHIP Not {}");
    let bytes = builder.into_inner().unwrap().finish().unwrap();

    let archive = TarGzDecoder.decode(bytes).unwrap();
    let paths: Vec<&str> = archive
        .entries()
        .iter()
        .map(|e| e.relative_path.as_str())
        .collect();

    assert_eq!(paths, vec!["projects/01/Not.hdl"]);
}

#[tokio::test]
async fn entry_bytes_are_handed_over_on_read() {
    let bytes = build_tarball(&[("projects/01/Not.cmp", "|in |out|")]);

    let mut archive = TarGzDecoder.decode(bytes).unwrap();
    let entry = archive.entries()[0].clone();

    assert_eq!(archive.read_text(&entry).await.unwrap(), "|in |out|");
    assert_eq!(archive.read_text(&entry).await.unwrap(), "");
}
