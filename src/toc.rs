use serde::{Deserialize, Deserializer};
use tracing::debug;
use wiki_api::{Action, Query, Transport};

use crate::error::WikiError;
use crate::session::Session;

const MISSING_TITLE: &str = "missingtitle";

/// One row of a page outline, laid out as the parse API reports sections.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TocEntry {
    #[serde(default)]
    pub toclevel: u32,
    #[serde(default)]
    pub level: String,
    /// Heading text.
    #[serde(default)]
    pub line: String,
    #[serde(default)]
    pub number: String,
    #[serde(default)]
    pub index: String,
    /// Page the heading comes from; `None` for headings the server could not
    /// attribute to a page.
    #[serde(default, deserialize_with = "title_or_false")]
    pub fromtitle: Option<String>,
    #[serde(default)]
    pub byteoffset: Option<u64>,
    #[serde(default)]
    pub anchor: String,
}

impl TocEntry {
    /// Synthetic level-0 entry standing for the page itself.
    pub fn root(page: &str) -> Self {
        Self {
            toclevel: 0,
            level: "0".to_owned(),
            line: String::new(),
            number: "0".to_owned(),
            index: "0".to_owned(),
            fromtitle: Some(page.to_owned()),
            byteoffset: Some(0),
            anchor: String::new(),
        }
    }
}

fn title_or_false<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum TitleOrFlag {
        Title(String),
        Flag(bool),
    }

    Ok(match Option::<TitleOrFlag>::deserialize(deserializer)? {
        Some(TitleOrFlag::Title(title)) => Some(title),
        Some(TitleOrFlag::Flag(_)) | None => None,
    })
}

impl<T: Transport> Session<T> {
    /// Section outline of `page`, led by [`TocEntry::root`].
    ///
    /// An empty outline is ambiguous; the page is probed to tell "no
    /// sections" from "no page", and only the latter is reported as
    /// [`WikiError::TocForMissingPage`]. Servers that reject the parse with
    /// `missingtitle` get the same warning.
    pub fn get_toc(
        &self,
        page: &str,
        revision_id: Option<u64>,
    ) -> Result<Vec<TocEntry>, WikiError> {
        debug!(page, "fetching TOC");
        let mut query = Query::new(Action::Parse).param("prop", "sections");
        match revision_id {
            Some(revision_id) => query.set("oldid", revision_id),
            None => query.set("page", page),
        }

        let response = match self.raw_query(&query, None) {
            Err(error) if error.api_code() == Some(MISSING_TITLE) => {
                return Err(WikiError::TocForMissingPage {
                    title: page.to_owned(),
                });
            }
            other => other?,
        };
        let sections = match response
            .get("parse")
            .and_then(|parse| parse.get("sections"))
        {
            Some(sections) => Vec::<TocEntry>::deserialize(sections)
                .map_err(|error| WikiError::shape(format!("parse sections: {error}")))?,
            None => Vec::new(),
        };

        if sections.is_empty() {
            match self.fetch_revision(page, false, revision_id, None) {
                Ok(probe) if !probe.revisions.is_empty() => {}
                Ok(_) | Err(WikiError::PageNotFound { .. }) => {
                    return Err(WikiError::TocForMissingPage {
                        title: page.to_owned(),
                    });
                }
                Err(error) => return Err(error),
            }
        }

        let mut toc = Vec::with_capacity(sections.len() + 1);
        toc.push(TocEntry::root(page));
        toc.extend(sections);
        Ok(toc)
    }
}
