//! Media-file operations, composed onto any [`Session`] as an extension trait.

use serde::Deserialize;
use tracing::debug;
use wiki_api::{Action, FormBody, Query, Transport};

use crate::error::WikiError;
use crate::page::first_page;
use crate::session::Session;

const UPLOAD_SUCCESS: &str = "Success";

/// Copy of a remote file into the wiki via upload-by-URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaCopy {
    pub source_url: String,
    /// Target file name, without the `File:` namespace.
    pub file_name: String,
    pub comment: String,
    /// Initial text of the file description page.
    pub page_text: Option<String>,
    pub ignore_warnings: bool,
}

impl MediaCopy {
    pub fn new(
        source_url: impl Into<String>,
        file_name: impl Into<String>,
        comment: impl Into<String>,
    ) -> Self {
        Self {
            source_url: source_url.into(),
            file_name: file_name.into(),
            comment: comment.into(),
            page_text: None,
            ignore_warnings: false,
        }
    }

    #[must_use]
    pub fn with_page_text(mut self, text: impl Into<String>) -> Self {
        self.page_text = Some(text.into());
        self
    }

    #[must_use]
    pub fn ignoring_warnings(mut self) -> Self {
        self.ignore_warnings = true;
        self
    }
}

/// The `upload` object of an `action=upload` response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadResult {
    pub result: String,
    pub filename: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ImageInfoPage {
    #[serde(default)]
    imageinfo: Vec<ImageInfo>,
}

#[derive(Debug, Deserialize)]
struct ImageInfo {
    url: Option<String>,
    user: Option<String>,
}

/// Media capability: locate files, identify uploaders, copy files in.
pub trait MediaExt {
    /// Direct URL of the latest revision of `file_title`.
    fn media_location(&self, file_title: &str) -> Result<String, WikiError>;

    /// User who uploaded the latest revision of `file_title`.
    fn media_uploader(&self, file_title: &str) -> Result<String, WikiError>;

    /// Upload `copy.source_url` as `copy.file_name`, using the session's edit
    /// token.
    fn copy_media(&mut self, copy: &MediaCopy) -> Result<UploadResult, WikiError>;
}

impl<T: Transport> Session<T> {
    fn latest_image_info(&self, file_title: &str, prop: &str) -> Result<ImageInfo, WikiError> {
        let query = Query::new(Action::Query)
            .param("prop", "imageinfo")
            .param("titles", file_title)
            .param("iilimit", 1)
            .param("iiprop", prop);
        let response = self.raw_query(&query, None)?;
        let page = match first_page(&response) {
            Some(page) => ImageInfoPage::deserialize(page)
                .map_err(|error| WikiError::shape(format!("image info: {error}")))?,
            None => ImageInfoPage::default(),
        };
        page.imageinfo
            .into_iter()
            .next()
            .ok_or_else(|| WikiError::MediaNotFound {
                title: file_title.to_owned(),
            })
    }
}

impl<T: Transport> MediaExt for Session<T> {
    fn media_location(&self, file_title: &str) -> Result<String, WikiError> {
        debug!(file_title, "retrieving media location");
        self.latest_image_info(file_title, "url")?
            .url
            .ok_or_else(|| WikiError::MediaNotFound {
                title: file_title.to_owned(),
            })
    }

    fn media_uploader(&self, file_title: &str) -> Result<String, WikiError> {
        debug!(file_title, "finding media uploader");
        let missing = || WikiError::UploaderUnknown {
            title: file_title.to_owned(),
        };
        match self.latest_image_info(file_title, "user") {
            Ok(info) => info.user.ok_or_else(missing),
            Err(WikiError::MediaNotFound { .. }) => Err(missing()),
            Err(error) => Err(error),
        }
    }

    fn copy_media(&mut self, copy: &MediaCopy) -> Result<UploadResult, WikiError> {
        debug!(file_name = %copy.file_name, source = %copy.source_url, "copying media");
        let token = self
            .edit_token
            .clone()
            .ok_or(WikiError::MissingEditToken)?;

        let mut form = FormBody::new();
        form.insert("filename".to_owned(), copy.file_name.clone());
        form.insert("url".to_owned(), copy.source_url.clone());
        form.insert("comment".to_owned(), copy.comment.clone());
        form.insert("token".to_owned(), token);
        if let Some(text) = &copy.page_text {
            form.insert("text".to_owned(), text.clone());
        }
        if copy.ignore_warnings {
            form.insert("ignorewarnings".to_owned(), "1".to_owned());
        }

        let response = self.raw_query(&Query::new(Action::Upload), Some(&form))?;
        let upload = response
            .get("upload")
            .ok_or_else(|| WikiError::shape("upload response without an 'upload' object"))?;
        let result = UploadResult::deserialize(upload)
            .map_err(|error| WikiError::shape(format!("upload result: {error}")))?;
        if result.result != UPLOAD_SUCCESS {
            return Err(WikiError::UploadRejected {
                file_name: copy.file_name.clone(),
                result: result.result,
            });
        }
        Ok(result)
    }
}
