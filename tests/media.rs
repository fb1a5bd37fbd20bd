mod fixture;

use fixture::{logged_in, session, wiki};
use wiki_mock::MOCK_UPLOAD_BASE;
use wikibot::{MediaCopy, MediaExt, Severity, WikiError};

const LOGO_URL: &str = "https://upload.wiki.test/images/Logo.png";

#[test]
fn location_and_uploader_come_from_the_latest_file_revision() {
    let wiki = wiki().with_file("File:Logo.png", LOGO_URL, "Designer");
    let session = session(&wiki);

    assert_eq!(
        session.media_location("File:Logo.png").expect("file exists"),
        LOGO_URL
    );
    assert_eq!(
        session.media_uploader("File:Logo.png").expect("file exists"),
        "Designer"
    );

    let request = wiki.last_request().expect("query was sent");
    assert_eq!(request.param("prop"), Some("imageinfo"));
    assert_eq!(request.param("iiprop"), Some("user"));
}

#[test]
fn missing_media_is_an_error() {
    let wiki = wiki();
    let session = session(&wiki);

    let location = session
        .media_location("File:Missing.png")
        .expect_err("no such file");
    assert!(matches!(location, WikiError::MediaNotFound { .. }));
    assert_eq!(location.severity(), Severity::Error);

    let uploader = session
        .media_uploader("File:Missing.png")
        .expect_err("no such file");
    assert!(matches!(uploader, WikiError::UploaderUnknown { .. }));
}

#[test]
fn copy_needs_an_edit_token() {
    let wiki = wiki();
    let mut session = logged_in(&wiki);

    let copy = MediaCopy::new(LOGO_URL, "Copied.png", "copy");
    let error = session.copy_media(&copy).expect_err("no token yet");
    assert!(matches!(error, WikiError::MissingEditToken));
    assert!(error.is_warning());
    assert_eq!(wiki.request_count(), 0);
}

#[test]
fn copy_uploads_by_url() {
    let wiki = wiki().with_page("Sandbox", "hello");
    let mut session = logged_in(&wiki);
    session
        .get_page("Sandbox", true, None, None)
        .expect("token read");

    let copy = MediaCopy::new(LOGO_URL, "Copied logo.png", "Imported logo")
        .with_page_text("{{Information|source=upstream}}");
    let result = session.copy_media(&copy).expect("upload succeeds");
    assert_eq!(result.result, "Success");
    assert_eq!(result.filename.as_deref(), Some("Copied logo.png"));

    let request = wiki.last_request().expect("upload was sent");
    assert_eq!(request.action(), Some("upload"));
    assert_eq!(request.param("url"), Some(LOGO_URL));
    assert_eq!(
        wiki.file_url("File:Copied logo.png"),
        Some(format!("{MOCK_UPLOAD_BASE}/Copied_logo.png"))
    );
    assert_eq!(
        wiki.page_text("File:Copied logo.png").as_deref(),
        Some("{{Information|source=upstream}}")
    );
    assert_eq!(
        session
            .media_uploader("File:Copied logo.png")
            .expect("just uploaded"),
        fixture::BOT_USER
    );
}

#[test]
fn copy_over_an_existing_file_needs_ignore_warnings() {
    let wiki = wiki()
        .with_page("Sandbox", "hello")
        .with_file("File:Logo.png", LOGO_URL, "Designer");
    let mut session = logged_in(&wiki);
    session
        .get_page("Sandbox", true, None, None)
        .expect("token read");

    let copy = MediaCopy::new(LOGO_URL, "Logo.png", "re-import");
    let error = session.copy_media(&copy).expect_err("file exists");
    assert!(matches!(&error, WikiError::UploadRejected { result, .. } if result == "Warning"));
    assert_eq!(error.severity(), Severity::Error);

    session
        .copy_media(&copy.clone().ignoring_warnings())
        .expect("warnings ignored");
    assert_eq!(
        wiki.last_request().and_then(|r| r.param("ignorewarnings").map(str::to_owned)),
        Some("1".to_owned())
    );
}
