use tokio::io::AsyncWriteExt;

use super::Fs;
use crate::{ArcPath, ArcStr};

#[tokio::test]
async fn test_write_and_read_roundtrip() {
    let fs = Fs::mock();
    let path = ArcPath::from(std::path::Path::new("roundtrip.txt"));

    fs.write_string(path.clone(), ArcStr::from("hello")).await.unwrap();
    let content = fs.read_to_string(path).await.unwrap();
    assert_eq!(&*content, "hello");
}

#[tokio::test]
async fn test_write_replaces_content() {
    let fs = Fs::mock();
    let path = ArcPath::from(std::path::Path::new("replace.txt"));

    fs.write_string(path.clone(), ArcStr::from("first")).await.unwrap();
    fs.write_string(path.clone(), ArcStr::from("second")).await.unwrap();
    let content = fs.read_to_string(path).await.unwrap();
    assert_eq!(&*content, "second");
}

#[tokio::test]
async fn test_open_file_appends() {
    let fs = Fs::mock();
    let path = ArcPath::from(std::path::Path::new("append.log"));

    let file = fs.open_file(path.clone()).await.unwrap();
    {
        let mut lock = file.write().await;
        lock.write_all(b"one\n").await.unwrap();
        lock.write_all(b"two\n").await.unwrap();
        lock.flush().await.unwrap();
    }

    let content = fs.read_to_string(path).await.unwrap();
    assert_eq!(&*content, "one\ntwo\n");
}

#[tokio::test]
async fn test_mkdir_and_read_dir() {
    let fs = Fs::mock();
    let dir = ArcPath::from(std::path::Path::new("logs"));

    fs.mkdir(dir.clone()).await.unwrap();
    fs.write_string(
        ArcPath::from(std::path::Path::new("logs/a.log")),
        ArcStr::from(""),
    )
    .await
    .unwrap();
    fs.write_string(
        ArcPath::from(std::path::Path::new("logs/b.log")),
        ArcStr::from(""),
    )
    .await
    .unwrap();

    let entries = fs.read_dir(dir).await.unwrap();
    assert_eq!(entries.len(), 2);
}

#[tokio::test]
async fn test_remove_file() {
    let fs = Fs::mock();
    let path = ArcPath::from(std::path::Path::new("victim.txt"));

    fs.write_string(path.clone(), ArcStr::from("x")).await.unwrap();
    fs.remove_file(path.clone()).await.unwrap();
    assert!(fs.read_to_string(path).await.is_err());
}

#[tokio::test]
async fn test_read_missing_file_fails() {
    let fs = Fs::mock();
    let path = ArcPath::from(std::path::Path::new("missing.txt"));
    assert!(fs.read_to_string(path).await.is_err());
}

#[tokio::test]
async fn test_actual_fs_roundtrip() {
    let temp_dir = tempfile::tempdir().unwrap();
    let fs = Fs::spawn();
    let path = ArcPath::from(temp_dir.path().join("real.txt").as_path());

    fs.write_string(path.clone(), ArcStr::from("on disk")).await.unwrap();
    let content = fs.read_to_string(path).await.unwrap();
    assert_eq!(&*content, "on disk");
}
