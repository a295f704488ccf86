//! Persistence of chats and content entities in sled.
//!
//! Two trees keyed by entity id, values are JSON. Every read a handler makes
//! goes through an owner check, and a record owned by someone else is
//! reported as missing.

use chrono::Utc;
use sled::{Db, Tree};
use tracing::debug;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{ChatEntity, ContentEntity, NewContent};

pub const CHATS_TREE: &str = "chats";
pub const CONTENTS_TREE: &str = "contents";

#[derive(Clone)]
pub struct Store {
    db: Db,
    chats: Tree,
    contents: Tree,
}

impl Store {
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self> {
        Self::from_db(sled::open(path)?)
    }

    /// In-memory database that disappears on drop.
    pub fn temporary() -> Result<Self> {
        Self::from_db(sled::Config::new().temporary(true).open()?)
    }

    fn from_db(db: Db) -> Result<Self> {
        Ok(Self {
            chats: db.open_tree(CHATS_TREE)?,
            contents: db.open_tree(CONTENTS_TREE)?,
            db,
        })
    }

    pub async fn flush(&self) -> Result<()> {
        self.db.flush_async().await?;
        Ok(())
    }

    // ========================================================================
    // Chats
    // ========================================================================

    pub fn create_chat(&self, user_id: &str, title: &str) -> Result<ChatEntity> {
        let now = Utc::now();
        let chat = ChatEntity {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            title: title.to_string(),
            created_at: now,
            updated_at: now,
        };
        self.put_chat(&chat)?;
        debug!("Created chat {} for {}", chat.id, user_id);
        Ok(chat)
    }

    pub fn get_chat(&self, user_id: &str, chat_id: &str) -> Result<ChatEntity> {
        let chat: Option<ChatEntity> = read(&self.chats, chat_id)?;
        chat.filter(|c| c.user_id == user_id)
            .ok_or_else(|| Error::NotFound(format!("chat {}", chat_id)))
    }

    /// The user's chats, most recently updated first.
    pub fn list_chats(&self, user_id: &str) -> Result<Vec<ChatEntity>> {
        let mut chats: Vec<ChatEntity> = scan(&self.chats)?
            .into_iter()
            .filter(|c: &ChatEntity| c.user_id == user_id)
            .collect();
        chats.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(chats)
    }

    pub fn rename_chat(&self, user_id: &str, chat_id: &str, title: &str) -> Result<ChatEntity> {
        let title = title.trim();
        if title.is_empty() {
            return Err(Error::InvalidInput("chat title cannot be empty".to_string()));
        }
        let mut chat = self.get_chat(user_id, chat_id)?;
        chat.title = title.to_string();
        chat.updated_at = Utc::now();
        self.put_chat(&chat)?;
        Ok(chat)
    }

    /// Bumps `updated_at` so the chat sorts first.
    pub fn touch_chat(&self, user_id: &str, chat_id: &str) -> Result<ChatEntity> {
        let mut chat = self.get_chat(user_id, chat_id)?;
        chat.updated_at = Utc::now();
        self.put_chat(&chat)?;
        Ok(chat)
    }

    /// Deletes the chat and every content entity in it.
    pub fn delete_chat(&self, user_id: &str, chat_id: &str) -> Result<usize> {
        let chat = self.get_chat(user_id, chat_id)?;
        let contents = self.list_contents(user_id, &chat.id)?;
        for content in &contents {
            self.contents.remove(content.id.as_bytes())?;
        }
        self.chats.remove(chat.id.as_bytes())?;
        debug!("Deleted chat {} and {} content items", chat.id, contents.len());
        Ok(contents.len())
    }

    fn put_chat(&self, chat: &ChatEntity) -> Result<()> {
        write(&self.chats, &chat.id, chat)
    }

    // ========================================================================
    // Contents
    // ========================================================================

    pub fn create_content(&self, new: NewContent) -> Result<ContentEntity> {
        let content = ContentEntity {
            id: Uuid::new_v4().to_string(),
            chat_id: new.chat_id,
            user_id: new.user_id,
            kind: new.kind,
            content: new.content,
            prompt: new.prompt,
            model: new.model,
            created_at: Utc::now(),
        };
        write(&self.contents, &content.id, &content)?;
        Ok(content)
    }

    pub fn get_content(&self, user_id: &str, content_id: &str) -> Result<ContentEntity> {
        let content: Option<ContentEntity> = read(&self.contents, content_id)?;
        content
            .filter(|c| c.user_id == user_id)
            .ok_or_else(|| Error::NotFound(format!("content {}", content_id)))
    }

    /// Contents of one chat, oldest first.
    pub fn list_contents(&self, user_id: &str, chat_id: &str) -> Result<Vec<ContentEntity>> {
        let mut contents: Vec<ContentEntity> = scan(&self.contents)?
            .into_iter()
            .filter(|c: &ContentEntity| c.chat_id == chat_id && c.user_id == user_id)
            .collect();
        contents.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(contents)
    }

    /// Replaces the text of a content entity. The kind never changes.
    pub fn update_content(&self, user_id: &str, content_id: &str, text: &str) -> Result<ContentEntity> {
        self.modify_content(user_id, content_id, |_| Ok(text.to_string()))
    }

    /// Rewrites the text of a content entity from its current stored value.
    ///
    /// The swap only lands if nobody wrote the record since it was read;
    /// otherwise `edit` runs again on the fresh value. An error from `edit`
    /// leaves the record untouched.
    pub fn modify_content<F>(&self, user_id: &str, content_id: &str, mut edit: F) -> Result<ContentEntity>
    where
        F: FnMut(&ContentEntity) -> Result<String>,
    {
        loop {
            let stored = self
                .contents
                .get(content_id.as_bytes())?
                .ok_or_else(|| Error::NotFound(format!("content {}", content_id)))?;
            let mut content: ContentEntity = serde_json::from_slice(&stored)?;
            if content.user_id != user_id {
                return Err(Error::NotFound(format!("content {}", content_id)));
            }

            content.content = edit(&content)?;
            let encoded = serde_json::to_vec(&content)?;
            match self
                .contents
                .compare_and_swap(content_id.as_bytes(), Some(stored), Some(encoded))?
            {
                Ok(()) => return Ok(content),
                Err(_) => debug!("Content {} changed underneath an edit, retrying", content_id),
            }
        }
    }

    pub fn delete_content(&self, user_id: &str, content_id: &str) -> Result<ContentEntity> {
        let content = self.get_content(user_id, content_id)?;
        self.contents.remove(content.id.as_bytes())?;
        Ok(content)
    }
}

// ============================================================================
// Encoding
// ============================================================================

fn read<T: serde::de::DeserializeOwned>(tree: &Tree, key: &str) -> Result<Option<T>> {
    match tree.get(key.as_bytes())? {
        Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        None => Ok(None),
    }
}

fn write<T: serde::Serialize>(tree: &Tree, key: &str, value: &T) -> Result<()> {
    tree.insert(key.as_bytes(), serde_json::to_vec(value)?)?;
    Ok(())
}

fn scan<T: serde::de::DeserializeOwned>(tree: &Tree) -> Result<Vec<T>> {
    tree.iter()
        .values()
        .map(|bytes| -> Result<T> { Ok(serde_json::from_slice(&bytes?)?) })
        .collect()
}
