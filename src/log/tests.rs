use super::*;
use crate::ArcPath;
use crate::fs::Fs;

#[tokio::test]
async fn test_log_info_warn_error() {
    let log = Log::mock();
    log.info("test", "info");
    log.warn("test", "warn");
    log.error("test", "error");
    // Should not panic or do anything
}

#[tokio::test]
async fn test_log_warn_on_error() {
    let log = Log::mock();
    let ok: Result<u32, &str> = Ok(42);
    let err: Result<u32, &str> = Err("fail");
    assert_eq!(log.warn_on_error("test", ok), Ok(42));
    assert!(log.warn_on_error("test", err).is_err());
}

#[tokio::test]
async fn test_log_error_on_error() {
    let log = Log::mock();
    let ok: Result<u32, &str> = Ok(42);
    let err: Result<u32, &str> = Err("fail");
    assert_eq!(log.error_on_error("test", ok), Ok(42));
    assert!(log.error_on_error("test", err).is_err());
}

#[tokio::test]
async fn test_log_get_messages() {
    let log = Log::mock();
    log.info("test", "test message");
    log.warn("test", "warning message");

    // Give some time for async operations to complete
    tokio::time::sleep(tokio::time::Duration::from_millis(10)).await;

    let messages = log.get_messages().await;
    assert!(messages.is_some());
    let messages = messages.unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].level, LogLevel::Info);
    assert_eq!(messages[0].message, "test message");
    assert_eq!(messages[1].level, LogLevel::Warning);
    assert_eq!(messages[1].message, "warning message");
}

#[tokio::test]
async fn test_actual_log_writes_files() {
    let fs = Fs::mock();
    let log_dir = ArcPath::from(std::path::Path::new("logs"));
    let log = Log::spawn(fs.clone(), LogLevel::Error, 0, log_dir.clone())
        .await
        .unwrap();

    log.info("test", "a line in the file");
    tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;

    let latest = fs
        .read_to_string(ArcPath::from(log_dir.join("latest.log").as_path()))
        .await
        .unwrap();
    assert!(latest.contains("a line in the file"));

    let entries = fs.read_dir(log_dir).await.unwrap();
    // latest.log plus the timestamped file
    assert_eq!(entries.len(), 2);
}

#[tokio::test]
async fn test_log_level_parsing() {
    use std::str::FromStr;
    assert_eq!(LogLevel::from_str("info").unwrap(), LogLevel::Info);
    assert_eq!(LogLevel::from_str("WARN").unwrap(), LogLevel::Warning);
    assert_eq!(LogLevel::from_str("Error").unwrap(), LogLevel::Error);
    assert!(LogLevel::from_str("loud").is_err());
}
