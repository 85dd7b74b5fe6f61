use super::*;

/// # Safety
/// Callers must not race other threads reading the environment.
unsafe fn clear_app_env() {
    unsafe {
        std::env::remove_var("FIRESTORE_PROJECT_ID");
        std::env::remove_var("FIRESTORE_BASE_URL");
        std::env::remove_var("ATTENDANCE_COLLECTION");
        std::env::remove_var("USERS_COLLECTION");
        std::env::remove_var("QR_IMAGE_BASE_URL");
        std::env::remove_var("QR_IMAGE_SIZE");
        std::env::remove_var("HTTP_REQUEST_TIMEOUT_SECS");
        std::env::remove_var("HTTP_CONNECT_TIMEOUT_SECS");
        std::env::remove_var("SESSION_UID");
        std::env::remove_var("SESSION_ID_TOKEN");
    }
}

// Env mutation is process-wide; run these assertions in one test so they
// never interleave with each other under the default parallel runner.
#[test]
fn from_env_scenarios() {
    unsafe {
        clear_app_env();
    }
    let err = AppConfig::from_env().unwrap_err();
    assert_eq!(err, ConfigError::Missing { var: "FIRESTORE_PROJECT_ID".into() });

    unsafe {
        std::env::set_var("FIRESTORE_PROJECT_ID", "campus-attendance");
    }
    let cfg = AppConfig::from_env().unwrap();
    assert_eq!(cfg.firestore.project_id, "campus-attendance");
    assert_eq!(cfg.firestore.base_url, DEFAULT_FIRESTORE_BASE_URL);
    assert_eq!(cfg.firestore.attendance_collection, "attendance");
    assert_eq!(cfg.firestore.users_collection, "users");
    assert_eq!(cfg.qr, QrConfig { base_url: DEFAULT_QR_IMAGE_BASE_URL.into(), size: DEFAULT_QR_IMAGE_SIZE });
    assert_eq!(
        cfg.timeouts,
        HttpTimeouts {
            request_secs: DEFAULT_HTTP_REQUEST_TIMEOUT_SECS,
            connect_secs: DEFAULT_HTTP_CONNECT_TIMEOUT_SECS
        }
    );
    assert!(cfg.session.is_none());

    unsafe {
        std::env::set_var("FIRESTORE_BASE_URL", "http://localhost:8080/v1/");
        std::env::set_var("ATTENDANCE_COLLECTION", "checkins");
        std::env::set_var("QR_IMAGE_SIZE", "300");
        std::env::set_var("HTTP_REQUEST_TIMEOUT_SECS", "5");
        std::env::set_var("SESSION_UID", "uid-1");
        std::env::set_var("SESSION_ID_TOKEN", "tok");
    }
    let cfg = AppConfig::from_env().unwrap();
    assert_eq!(cfg.firestore.base_url, "http://localhost:8080/v1");
    assert_eq!(
        cfg.firestore.documents_url(),
        "http://localhost:8080/v1/projects/campus-attendance/databases/(default)/documents"
    );
    assert_eq!(cfg.firestore.attendance_collection, "checkins");
    assert_eq!(cfg.qr.size, 300);
    assert_eq!(cfg.timeouts.request_secs, 5);
    assert_eq!(cfg.session, Some(SessionUser { uid: "uid-1".into(), id_token: "tok".into() }));

    unsafe {
        std::env::remove_var("SESSION_ID_TOKEN");
    }
    assert!(AppConfig::from_env().unwrap().session.is_none());

    unsafe {
        std::env::set_var("QR_IMAGE_SIZE", "big");
    }
    let err = AppConfig::from_env().unwrap_err();
    assert_eq!(err, ConfigError::Invalid { var: "QR_IMAGE_SIZE".into(), value: "big".into() });
    assert!(err.to_string().contains("QR_IMAGE_SIZE"));

    unsafe { clear_app_env() };
}
