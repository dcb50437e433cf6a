//! [`SqliteStore`] — the SQLite implementation of [`SocialStore`].

use std::{collections::HashMap, path::Path};

use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use sib_core::{
  post::{Comment, CommentView, Post, PostView},
  query::{effective_limit, effective_offset, FeedQuery, FriendQuery, FriendSort, SortOrder},
  store::SocialStore,
  user::{Credential, Profile, User},
};

use crate::{
  encode::{
    decode_uuid, encode_dt, encode_uuid, RawCommentView, RawPost, RawPostView, RawProfile,
    RawUser,
  },
  schema::SCHEMA,
  Result,
};

const USER_COLUMNS: &str =
  "user_id, name, email, phone, password_hash, image_url, friend_count, created_at";

/// The five public columns every friend listing and author join selects.
const PROFILE_COLUMNS: &str = "u.user_id, u.name, u.image_url, u.friend_count, u.created_at";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A social graph store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn user_where(&self, column: &'static str, value: String) -> Result<Option<User>> {
    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {column} = ?1");
        Ok(
          conn
            .query_row(&sql, rusqlite::params![value], |row| {
              Ok(RawUser {
                user_id:       row.get(0)?,
                name:          row.get(1)?,
                email:         row.get(2)?,
                phone:         row.get(3)?,
                password_hash: row.get(4)?,
                image_url:     row.get(5)?,
                friend_count:  row.get(6)?,
                created_at:    row.get(7)?,
              })
            })
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }
}

// ─── SocialStore impl ────────────────────────────────────────────────────────

impl SocialStore for SqliteStore {
  type Error = crate::Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn insert_user(&self, user: User) -> Result<()> {
    let user_id_str    = encode_uuid(user.user_id);
    let created_at_str = encode_dt(user.created_at);
    let name           = user.name;
    let email          = user.email;
    let phone          = user.phone;
    let password_hash  = user.password_hash;
    let image_url      = user.image_url;
    let friend_count   = user.friend_count;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (
             user_id, name, email, phone, password_hash,
             image_url, friend_count, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            user_id_str,
            name,
            email,
            phone,
            password_hash,
            image_url,
            friend_count,
            created_at_str,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn user_by_id(&self, id: Uuid) -> Result<Option<User>> {
    self.user_where("user_id", encode_uuid(id)).await
  }

  async fn user_by_credential(&self, credential: &Credential) -> Result<Option<User>> {
    match credential {
      Credential::Email(v) => self.user_where("email", v.clone()).await,
      Credential::Phone(v) => self.user_where("phone", v.clone()).await,
    }
  }

  async fn update_profile(&self, user_id: Uuid, name: String, image_url: String) -> Result<()> {
    let id_str = encode_uuid(user_id);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE users SET name = ?2, image_url = ?3 WHERE user_id = ?1",
          rusqlite::params![id_str, name, image_url],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn link_credential(&self, user_id: Uuid, credential: Credential) -> Result<()> {
    let id_str = encode_uuid(user_id);
    let (column, value) = match credential {
      Credential::Email(v) => ("email", v),
      Credential::Phone(v) => ("phone", v),
    };

    self
      .conn
      .call(move |conn| {
        let sql = format!("UPDATE users SET {column} = ?2 WHERE user_id = ?1");
        conn.execute(&sql, rusqlite::params![id_str, value])?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Friendship edges ──────────────────────────────────────────────────────

  async fn edge_exists(&self, a: Uuid, b: Uuid) -> Result<bool> {
    let a_str = encode_uuid(a);
    let b_str = encode_uuid(b);

    let exists = self
      .conn
      .call(move |conn| {
        let exists: bool = conn
          .query_row(
            "SELECT 1 FROM friend_edges WHERE user_id = ?1 AND friend_id = ?2",
            rusqlite::params![a_str, b_str],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        Ok(exists)
      })
      .await?;

    Ok(exists)
  }

  async fn create_friendship(&self, a: Uuid, b: Uuid) -> Result<bool> {
    let a_str = encode_uuid(a);
    let b_str = encode_uuid(b);

    let inserted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        // Both directed rows in one statement; the pair primary key turns a
        // concurrent duplicate into a constraint violation rather than a
        // partial write.
        let insert = tx.execute(
          "INSERT INTO friend_edges (user_id, friend_id) VALUES (?1, ?2), (?2, ?1)",
          rusqlite::params![a_str, b_str],
        );

        match insert {
          Ok(_) => {}
          Err(rusqlite::Error::SqliteFailure(e, _))
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
          {
            // Dropping the transaction here rolls it back.
            return Ok(false);
          }
          Err(e) => return Err(e.into()),
        }

        tx.execute(
          "UPDATE users SET friend_count = friend_count + 1 WHERE user_id IN (?1, ?2)",
          rusqlite::params![a_str, b_str],
        )?;

        tx.commit()?;
        Ok(true)
      })
      .await?;

    Ok(inserted)
  }

  async fn delete_friendship(&self, a: Uuid, b: Uuid) -> Result<bool> {
    let a_str = encode_uuid(a);
    let b_str = encode_uuid(b);

    let deleted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let removed = tx.execute(
          "DELETE FROM friend_edges
           WHERE (user_id = ?1 AND friend_id = ?2)
              OR (user_id = ?2 AND friend_id = ?1)",
          rusqlite::params![a_str, b_str],
        )?;

        if removed == 0 {
          return Ok(false);
        }

        tx.execute(
          "UPDATE users SET friend_count = friend_count - 1 WHERE user_id IN (?1, ?2)",
          rusqlite::params![a_str, b_str],
        )?;

        tx.commit()?;
        Ok(true)
      })
      .await?;

    Ok(deleted)
  }

  async fn friends_page(
    &self,
    viewer: Uuid,
    query: &FriendQuery,
  ) -> Result<(Vec<Profile>, u64)> {
    let viewer_str   = encode_uuid(viewer);
    let only_friends = query.only_friends;
    let pattern      = query
      .search
      .as_deref()
      .filter(|s| !s.is_empty())
      .map(|s| format!("%{s}%"));
    let sort_column  = match query.sort {
      FriendSort::FriendCount => "friend_count",
      FriendSort::CreatedAt => "created_at",
    };
    let sort_order   = match query.order {
      SortOrder::Asc => "ASC",
      SortOrder::Desc => "DESC",
    };
    let limit        = effective_limit(query.limit);
    let offset       = effective_offset(query.offset);

    let (raws, total): (Vec<RawProfile>, i64) = self
      .conn
      .call(move |conn| {
        // Build the WHERE clause dynamically; the listing always excludes
        // the viewer's own row.
        let mut conds: Vec<&'static str> = vec!["u.user_id != :viewer"];
        let mut params: Vec<(&str, &dyn rusqlite::ToSql)> = vec![(":viewer", &viewer_str)];

        if only_friends {
          conds
            .push("u.user_id IN (SELECT friend_id FROM friend_edges WHERE user_id = :viewer)");
        }
        if let Some(ref p) = pattern {
          conds.push("(u.name LIKE :search OR u.email LIKE :search OR u.phone LIKE :search)");
          params.push((":search", p));
        }

        let where_clause = format!("WHERE {}", conds.join(" AND "));

        // Total over the same predicate, before pagination. Run it before
        // :limit/:offset are bound — rusqlite rejects parameters the
        // statement does not name.
        let count_sql = format!("SELECT COUNT(*) FROM users u {where_clause}");
        let total: i64 = conn.query_row(&count_sql, params.as_slice(), |r| r.get(0))?;

        let page_sql = format!(
          "SELECT {PROFILE_COLUMNS}
           FROM users u
           {where_clause}
           ORDER BY u.{sort_column} {sort_order}
           LIMIT :limit OFFSET :offset"
        );
        params.push((":limit", &limit));
        params.push((":offset", &offset));

        let mut stmt = conn.prepare(&page_sql)?;
        let rows = stmt
          .query_map(params.as_slice(), |row| {
            Ok(RawProfile {
              user_id:      row.get(0)?,
              name:         row.get(1)?,
              image_url:    row.get(2)?,
              friend_count: row.get(3)?,
              created_at:   row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok((rows, total))
      })
      .await?;

    let profiles = raws
      .into_iter()
      .map(RawProfile::into_profile)
      .collect::<Result<Vec<_>>>()?;

    Ok((profiles, total as u64))
  }

  // ── Posts ─────────────────────────────────────────────────────────────────

  async fn insert_post(&self, post: Post, tags: Vec<String>) -> Result<()> {
    let post_id_str    = encode_uuid(post.post_id);
    let author_id_str  = encode_uuid(post.author_id);
    let created_at_str = encode_dt(post.created_at);
    let body_html      = post.body_html;

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        tx.execute(
          "INSERT INTO posts (post_id, author_id, body_html, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![post_id_str, author_id_str, body_html, created_at_str],
        )?;

        {
          let mut stmt = tx.prepare("INSERT INTO post_tags (post_id, tag) VALUES (?1, ?2)")?;
          for tag in &tags {
            stmt.execute(rusqlite::params![post_id_str, tag])?;
          }
        }

        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn post_by_id(&self, id: Uuid) -> Result<Option<Post>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawPost> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT post_id, author_id, body_html, created_at FROM posts WHERE post_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawPost {
                  post_id:    row.get(0)?,
                  author_id:  row.get(1)?,
                  body_html:  row.get(2)?,
                  created_at: row.get(3)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawPost::into_post).transpose()
  }

  async fn posts_page(&self, viewer: Uuid, query: &FeedQuery) -> Result<(Vec<PostView>, u64)> {
    let viewer_str = encode_uuid(viewer);
    let tags       = query.tags.clone();
    let pattern    = query
      .search
      .as_deref()
      .filter(|s| !s.is_empty())
      .map(|s| format!("%{s}%"));
    let limit      = effective_limit(query.limit);
    let offset     = effective_offset(query.offset);

    let (raws, total): (Vec<RawPostView>, i64) = self
      .conn
      .call(move |conn| {
        // Named placeholders for the tag list, generated to match its length.
        let tag_names: Vec<String> = (0..tags.len()).map(|i| format!(":tag{i}")).collect();

        let mut conds: Vec<String> = vec![
          "(p.author_id = :viewer
              OR p.author_id IN (SELECT friend_id FROM friend_edges WHERE user_id = :viewer))"
            .into(),
        ];
        let mut params: Vec<(&str, &dyn rusqlite::ToSql)> = vec![(":viewer", &viewer_str)];

        if !tags.is_empty() {
          conds.push(format!(
            "EXISTS (SELECT 1 FROM post_tags pt
              WHERE pt.post_id = p.post_id AND pt.tag IN ({}))",
            tag_names.join(", ")
          ));
          for (name, tag) in tag_names.iter().zip(&tags) {
            params.push((name.as_str(), tag));
          }
        }
        if let Some(ref p) = pattern {
          conds.push("p.body_html LIKE :search".into());
          params.push((":search", p));
        }

        let where_clause = format!("WHERE {}", conds.join(" AND "));

        let count_sql = format!("SELECT COUNT(*) FROM posts p {where_clause}");
        let total: i64 = conn.query_row(&count_sql, params.as_slice(), |r| r.get(0))?;

        let page_sql = format!(
          "SELECT p.post_id, p.body_html, p.created_at, {PROFILE_COLUMNS}
           FROM posts p
           JOIN users u ON u.user_id = p.author_id
           {where_clause}
           ORDER BY p.created_at DESC
           LIMIT :limit OFFSET :offset"
        );
        params.push((":limit", &limit));
        params.push((":offset", &offset));

        let mut stmt = conn.prepare(&page_sql)?;
        let rows = stmt
          .query_map(params.as_slice(), |row| {
            Ok(RawPostView {
              post_id:    row.get(0)?,
              body_html:  row.get(1)?,
              created_at: row.get(2)?,
              author:     RawProfile {
                user_id:      row.get(3)?,
                name:         row.get(4)?,
                image_url:    row.get(5)?,
                friend_count: row.get(6)?,
                created_at:   row.get(7)?,
              },
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok((rows, total))
      })
      .await?;

    let views = raws
      .into_iter()
      .map(RawPostView::into_view)
      .collect::<Result<Vec<_>>>()?;

    Ok((views, total as u64))
  }

  async fn comments_for_posts(
    &self,
    post_ids: &[Uuid],
  ) -> Result<HashMap<Uuid, Vec<CommentView>>> {
    if post_ids.is_empty() {
      return Ok(HashMap::new());
    }

    let ids: Vec<String> = post_ids.iter().copied().map(encode_uuid).collect();

    let raws: Vec<RawCommentView> = self
      .conn
      .call(move |conn| {
        let placeholders = (1..=ids.len())
          .map(|i| format!("?{i}"))
          .collect::<Vec<_>>()
          .join(", ");
        let sql = format!(
          "SELECT c.comment_id, c.post_id, c.body, c.created_at, {PROFILE_COLUMNS}
           FROM post_comments c
           JOIN users u ON u.user_id = c.author_id
           WHERE c.post_id IN ({placeholders})
           ORDER BY c.created_at DESC"
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(ids), |row| {
            Ok(RawCommentView {
              comment_id: row.get(0)?,
              post_id:    row.get(1)?,
              body:       row.get(2)?,
              created_at: row.get(3)?,
              author:     RawProfile {
                user_id:      row.get(4)?,
                name:         row.get(5)?,
                image_url:    row.get(6)?,
                friend_count: row.get(7)?,
                created_at:   row.get(8)?,
              },
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
      })
      .await?;

    // Rows arrive newest-first; pushing in order keeps each list sorted.
    let mut grouped: HashMap<Uuid, Vec<CommentView>> = HashMap::new();
    for raw in raws {
      let view = raw.into_view()?;
      grouped.entry(view.post_id).or_default().push(view);
    }

    Ok(grouped)
  }

  async fn tags_for_posts(&self, post_ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<String>>> {
    if post_ids.is_empty() {
      return Ok(HashMap::new());
    }

    let ids: Vec<String> = post_ids.iter().copied().map(encode_uuid).collect();

    let rows: Vec<(String, String)> = self
      .conn
      .call(move |conn| {
        let placeholders = (1..=ids.len())
          .map(|i| format!("?{i}"))
          .collect::<Vec<_>>()
          .join(", ");
        let sql = format!(
          "SELECT post_id, tag FROM post_tags
           WHERE post_id IN ({placeholders})
           ORDER BY post_id ASC, tag ASC"
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(ids), |row| {
            Ok((row.get(0)?, row.get(1)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
      })
      .await?;

    let mut grouped: HashMap<Uuid, Vec<String>> = HashMap::new();
    for (post_id_str, tag) in rows {
      grouped.entry(decode_uuid(&post_id_str)?).or_default().push(tag);
    }

    Ok(grouped)
  }

  async fn insert_comment(&self, comment: Comment) -> Result<()> {
    let comment_id_str = encode_uuid(comment.comment_id);
    let post_id_str    = encode_uuid(comment.post_id);
    let author_id_str  = encode_uuid(comment.author_id);
    let created_at_str = encode_dt(comment.created_at);
    let body           = comment.body;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO post_comments (comment_id, post_id, author_id, body, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![comment_id_str, post_id_str, author_id_str, body, created_at_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}
