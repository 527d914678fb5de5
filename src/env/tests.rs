use std::ffi::OsStr;

use super::Env;
use crate::ArcOsStr;

#[tokio::test]
async fn test_mock_env_creation() {
    let env = Env::mock();
    assert!(matches!(env, Env::Mock(_)));
}

#[tokio::test]
async fn test_actual_env_creation() {
    let env = Env::spawn();
    assert!(matches!(env, Env::Actual(_)));
}

#[tokio::test]
async fn test_mock_env_operations() {
    let env = Env::mock();
    let key = ArcOsStr::from(OsStr::new("TEST_MOCK_ENV"));
    let value = "test_value";

    env.set_env(key.clone(), value).await;
    let result = env.env(key.clone()).await.unwrap();
    assert_eq!(&*result, value);

    env.unset_env(key.clone()).await;
    let result = env.env(key).await;
    assert!(matches!(result, Err(std::env::VarError::NotPresent)));
}

#[tokio::test]
async fn test_actual_env_operations() {
    let env = Env::spawn();
    let key = ArcOsStr::from(OsStr::new("TEST_ACTUAL_ENV"));
    let value = "test_value";

    unsafe { std::env::remove_var(key.as_ref()) };
    assert!(std::env::var(key.as_ref()).is_err());

    env.set_env(key.clone(), value).await;
    let result = env.env(key.clone()).await.unwrap();
    assert_eq!(&*result, value);

    let std_result = std::env::var(key.as_ref()).unwrap();
    assert_eq!(std_result, value);

    env.unset_env(key.clone()).await;
    let result = env.env(key.clone()).await;
    assert!(matches!(result, Err(std::env::VarError::NotPresent)));
}

#[tokio::test]
async fn test_mock_env_preset_vars() {
    let mut vars = std::collections::HashMap::new();
    vars.insert(ArcOsStr::from(OsStr::new("PRESET")), crate::ArcStr::from("yes"));
    let env = Env::mock_with(vars);

    let result = env.env(ArcOsStr::from(OsStr::new("PRESET"))).await.unwrap();
    assert_eq!(&*result, "yes");
}
