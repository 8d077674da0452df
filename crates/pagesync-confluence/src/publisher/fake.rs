//! In-memory Confluence used by publisher tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use crate::api::ConfluenceApi;
use crate::error::ConfluenceError;
use crate::types::{
    Attachment, AttachmentExtensions, AttachmentMetadata, AttachmentUpload, Body, BodyValue,
    Container, Page, Space, Version,
};

/// Stored page.
#[derive(Debug, Clone)]
pub(crate) struct FakePage {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) version: u32,
    pub(crate) body: String,
    pub(crate) parent_id: String,
}

#[derive(Default)]
struct State {
    pages: Vec<FakePage>,
    attachments: HashMap<String, Vec<Attachment>>,
    next_id: u32,
    creates: usize,
    updates: usize,
    uploads: usize,
    failing_uploads: Vec<String>,
    failing_listings: HashSet<String>,
    conflicts: HashSet<String>,
}

impl State {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}{}", 100 + self.next_id)
    }
}

/// Single-space Confluence with one parent page.
pub(crate) struct FakeConfluence {
    space_key: String,
    state: Mutex<State>,
}

impl FakeConfluence {
    pub(crate) const PARENT_ID: &'static str = "1";

    pub(crate) fn new(space_key: &str) -> Self {
        Self {
            space_key: space_key.to_owned(),
            state: Mutex::new(State::default()),
        }
    }

    /// Add an existing page at version 1.
    pub(crate) fn add_page(&self, title: &str, body: &str) -> String {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id("");
        state.pages.push(FakePage {
            id: id.clone(),
            title: title.to_owned(),
            version: 1,
            body: body.to_owned(),
            parent_id: Self::PARENT_ID.to_owned(),
        });
        id
    }

    pub(crate) fn page_by_title(&self, title: &str) -> Option<FakePage> {
        let state = self.state.lock().unwrap();
        state.pages.iter().find(|p| p.title == title).cloned()
    }

    pub(crate) fn attachments(&self, page_id: &str) -> Vec<Attachment> {
        let state = self.state.lock().unwrap();
        state.attachments.get(page_id).cloned().unwrap_or_default()
    }

    pub(crate) fn create_count(&self) -> usize {
        self.state.lock().unwrap().creates
    }

    pub(crate) fn update_count(&self) -> usize {
        self.state.lock().unwrap().updates
    }

    pub(crate) fn upload_count(&self) -> usize {
        self.state.lock().unwrap().uploads
    }

    /// Fail uploads whose title ends with `file_name`.
    pub(crate) fn fail_uploads_of(&self, file_name: &str) {
        let mut state = self.state.lock().unwrap();
        state.failing_uploads.push(file_name.to_owned());
    }

    pub(crate) fn fail_attachment_listing(&self, page_id: &str) {
        let mut state = self.state.lock().unwrap();
        state.failing_listings.insert(page_id.to_owned());
    }

    /// Simulate a concurrent edit right before the next update of `title`.
    pub(crate) fn conflict_on_update(&self, title: &str) {
        let mut state = self.state.lock().unwrap();
        state.conflicts.insert(title.to_owned());
    }

    fn to_page(&self, page: &FakePage, with_body: bool) -> Page {
        Page {
            id: page.id.clone(),
            title: page.title.clone(),
            version: Some(Version {
                number: page.version,
            }),
            space: Some(Space {
                key: self.space_key.clone(),
            }),
            body: with_body.then(|| Body {
                storage: Some(BodyValue {
                    value: "<p>legacy</p>".to_owned(),
                    representation: "storage".to_owned(),
                }),
                atlas_doc_format: Some(BodyValue {
                    value: page.body.clone(),
                    representation: "atlas_doc_format".to_owned(),
                }),
            }),
        }
    }
}

fn server_error(body: &str) -> ConfluenceError {
    ConfluenceError::HttpResponse {
        status: 500,
        body: body.to_owned(),
    }
}

fn not_found(id: &str) -> ConfluenceError {
    ConfluenceError::HttpResponse {
        status: 404,
        body: format!("no content with id {id}"),
    }
}

impl ConfluenceApi for FakeConfluence {
    fn get_page(&self, page_id: &str, _expand: &[&str]) -> Result<Page, ConfluenceError> {
        if page_id == Self::PARENT_ID {
            let parent = FakePage {
                id: Self::PARENT_ID.to_owned(),
                title: "Parent".to_owned(),
                version: 1,
                body: String::new(),
                parent_id: String::new(),
            };
            return Ok(self.to_page(&parent, false));
        }
        let state = self.state.lock().unwrap();
        let page = state.pages.iter().find(|p| p.id == page_id);
        page.map(|p| self.to_page(p, false))
            .ok_or_else(|| not_found(page_id))
    }

    fn find_page_by_title(
        &self,
        space_key: &str,
        title: &str,
        _expand: &[&str],
    ) -> Result<Option<Page>, ConfluenceError> {
        assert_eq!(space_key, self.space_key);
        let state = self.state.lock().unwrap();
        let page = state.pages.iter().find(|p| p.title == title);
        Ok(page.map(|p| self.to_page(p, true)))
    }

    fn create_page(
        &self,
        space_key: &str,
        parent_id: &str,
        title: &str,
        adf: &str,
    ) -> Result<Page, ConfluenceError> {
        assert_eq!(space_key, self.space_key);
        let mut state = self.state.lock().unwrap();
        let page = FakePage {
            id: state.next_id(""),
            title: title.to_owned(),
            version: 1,
            body: adf.to_owned(),
            parent_id: parent_id.to_owned(),
        };
        state.creates += 1;
        state.pages.push(page.clone());
        Ok(self.to_page(&page, false))
    }

    fn update_page(
        &self,
        page_id: &str,
        parent_id: &str,
        title: &str,
        adf: &str,
        current_version: u32,
    ) -> Result<Page, ConfluenceError> {
        let mut state = self.state.lock().unwrap();
        let conflict = state.conflicts.contains(title);
        let page = state
            .pages
            .iter_mut()
            .find(|p| p.id == page_id)
            .ok_or_else(|| not_found(page_id))?;
        if conflict {
            page.version += 1;
        }
        if page.version != current_version {
            return Err(ConfluenceError::Conflict {
                page_id: page_id.to_owned(),
                body: format!("expected version {}", page.version + 1),
            });
        }
        page.version += 1;
        title.clone_into(&mut page.title);
        adf.clone_into(&mut page.body);
        parent_id.clone_into(&mut page.parent_id);
        let page = page.clone();
        state.updates += 1;
        Ok(self.to_page(&page, true))
    }

    fn list_attachments(&self, page_id: &str) -> Result<Vec<Attachment>, ConfluenceError> {
        let state = self.state.lock().unwrap();
        if state.failing_listings.contains(page_id) {
            return Err(server_error("attachment listing failed"));
        }
        Ok(state.attachments.get(page_id).cloned().unwrap_or_default())
    }

    fn upload_attachment(
        &self,
        page_id: &str,
        upload: &AttachmentUpload<'_>,
    ) -> Result<Attachment, ConfluenceError> {
        let mut state = self.state.lock().unwrap();
        if state
            .failing_uploads
            .iter()
            .any(|name| upload.file_name.ends_with(name.as_str()))
        {
            return Err(server_error("upload failed"));
        }

        let file_id = state.next_id("file-");
        state.uploads += 1;
        let attachment = Attachment {
            id: format!("att-{file_id}"),
            title: upload.file_name.to_owned(),
            metadata: Some(AttachmentMetadata {
                comment: Some(upload.comment.to_owned()),
            }),
            extensions: Some(AttachmentExtensions {
                file_id: Some(file_id),
                collection_name: Some(format!("contentId-{page_id}")),
            }),
            container: Some(Container {
                id: page_id.to_owned(),
            }),
        };

        let attachments = state.attachments.entry(page_id.to_owned()).or_default();
        attachments.retain(|a| a.title != attachment.title);
        attachments.push(attachment.clone());
        Ok(attachment)
    }
}
