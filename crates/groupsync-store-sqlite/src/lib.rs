//! SQLite backend for groupsync.
//!
//! Timestamps are stored as unix milliseconds and soft deletes as a non-zero `deleted_at`.

use chrono::{DateTime, Utc};
use groupsync_storage::{
    ChannelId, CreateGroupParams, CreateUserParams, Group, GroupId, GroupMember, GroupSearchOpts,
    GroupStore, GroupSyncable, Page, StoreError, Syncable, SyncableStore, SyncableType, TeamId,
    User, UserId,
};
use sqlx::{sqlite::SqlitePoolOptions, QueryBuilder, Sqlite, SqlitePool};
use uuid::Uuid;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

const GROUP_COLUMNS: &str = "g.id, g.name, g.display_name, g.description, g.source, g.remote_id,
        g.created_at, g.updated_at, g.deleted_at,
        (SELECT COUNT(*) FROM group_members m
           JOIN users u ON u.id = m.user_id
          WHERE m.group_id = g.id AND m.deleted_at = 0) AS member_count";

const SYNCABLE_COLUMNS: &str = "group_id, syncable_id, syncable_type, auto_add, scheme_admin,
        created_at, updated_at, deleted_at";

type GroupRow = (
    String,
    String,
    String,
    Option<String>,
    String,
    String,
    i64,
    i64,
    i64,
    i64,
);

type SyncableRow = (String, String, String, bool, bool, i64, i64, i64);

type UserRow = (String, String, String, i64);

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn open_in_memory() -> Result<Self, StoreError> {
        Self::open("sqlite::memory:").await
    }

    pub async fn open(url: &str) -> Result<Self, StoreError> {
        // In-memory databases are per connection, so a single connection keeps one schema.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(url)
            .await
            .map_err(backend)?;

        MIGRATOR.run(&pool).await.map_err(backend)?;

        Ok(Self { pool })
    }

    async fn fetch_group_syncable(
        &self,
        group_id: &GroupId,
        syncable: &Syncable,
    ) -> Result<GroupSyncable, StoreError> {
        let row = sqlx::query_as::<_, SyncableRow>(&format!(
            "SELECT {SYNCABLE_COLUMNS} FROM group_syncables
              WHERE group_id = ? AND syncable_id = ? AND syncable_type = ?"
        ))
        .bind(group_id.0.to_string())
        .bind(syncable.id().to_string())
        .bind(syncable.kind().as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        match row {
            None => Err(StoreError::NotFound),
            Some(row) => syncable_from_row(row),
        }
    }
}

// ───────────────────────────── Row mapping ─────────────────────────────

fn backend<E: std::fmt::Display>(e: E) -> StoreError {
    StoreError::Backend(e.to_string())
}

fn write_err(e: sqlx::Error) -> StoreError {
    let s = e.to_string();
    if s.contains("UNIQUE") {
        StoreError::AlreadyExists
    } else {
        StoreError::Backend(s)
    }
}

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

fn timestamp(ms: i64) -> Result<DateTime<Utc>, StoreError> {
    DateTime::from_timestamp_millis(ms)
        .ok_or_else(|| StoreError::Backend(format!("timestamp out of range: {}", ms)))
}

fn tombstone(ms: i64) -> Result<Option<DateTime<Utc>>, StoreError> {
    if ms == 0 {
        Ok(None)
    } else {
        timestamp(ms).map(Some)
    }
}

fn tombstone_millis(at: Option<DateTime<Utc>>) -> i64 {
    at.map(|t| t.timestamp_millis()).unwrap_or(0)
}

fn parse_uuid(s: &str) -> Result<Uuid, StoreError> {
    Uuid::try_parse(s).map_err(backend)
}

fn group_from_row(row: GroupRow, with_count: bool) -> Result<Group, StoreError> {
    let (id, name, display_name, description, source, remote_id, created, updated, deleted, count) =
        row;
    Ok(Group {
        id: GroupId(parse_uuid(&id)?),
        name,
        display_name,
        description,
        source: source.parse().map_err(StoreError::Backend)?,
        remote_id,
        created_at: timestamp(created)?,
        updated_at: timestamp(updated)?,
        deleted_at: tombstone(deleted)?,
        member_count: with_count.then_some(count),
    })
}

fn syncable_from_row(row: SyncableRow) -> Result<GroupSyncable, StoreError> {
    let (group_id, syncable_id, kind, auto_add, scheme_admin, created, updated, deleted) = row;
    let kind: SyncableType = kind.parse().map_err(backend)?;
    Ok(GroupSyncable {
        group_id: GroupId(parse_uuid(&group_id)?),
        syncable: Syncable::from_parts(kind, parse_uuid(&syncable_id)?),
        auto_add,
        scheme_admin,
        created_at: timestamp(created)?,
        updated_at: timestamp(updated)?,
        deleted_at: tombstone(deleted)?,
    })
}

fn user_from_row(row: UserRow) -> Result<User, StoreError> {
    let (id, username, email, created) = row;
    Ok(User {
        id: UserId(parse_uuid(&id)?),
        username,
        email,
        created_at: timestamp(created)?,
    })
}

/// `%` and `_` in user input match literally.
fn like_pattern(q: &str) -> String {
    let escaped = q
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

fn push_group_filters(qb: &mut QueryBuilder<'_, Sqlite>, opts: &GroupSearchOpts) {
    if !opts.include_deleted {
        qb.push(" AND g.deleted_at = 0");
    }
    if let Some(q) = opts.q.as_deref().filter(|q| !q.is_empty()) {
        qb.push(" AND g.display_name LIKE ")
            .push_bind(like_pattern(q))
            .push(" ESCAPE '\\'");
    }
    if let Some(team_id) = &opts.not_associated_to_team {
        qb.push(
            " AND g.id NOT IN (SELECT ta.group_id FROM group_syncables ta
                WHERE ta.syncable_type = 'team' AND ta.deleted_at = 0 AND ta.syncable_id = ",
        )
        .push_bind(team_id.0.to_string())
        .push(")");
    }
}

fn push_order_and_page(qb: &mut QueryBuilder<'_, Sqlite>, page: Option<Page>) {
    qb.push(" ORDER BY g.display_name, g.id");
    if let Some(page) = page {
        qb.push(" LIMIT ")
            .push_bind(page.limit() as i64)
            .push(" OFFSET ")
            .push_bind(page.offset() as i64);
    }
}

#[async_trait::async_trait]
impl GroupStore for SqliteStore {
    // ───────────────────────────── Groups ─────────────────────────────

    async fn create_group(&self, params: &CreateGroupParams) -> Result<Group, StoreError> {
        let id = GroupId::new();
        let now = now_millis();
        sqlx::query(
            "INSERT INTO groups(id, name, display_name, description, source, remote_id, created_at, updated_at)
             VALUES(?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(id.0.to_string())
        .bind(&params.name)
        .bind(&params.display_name)
        .bind(&params.description)
        .bind(params.source.as_str())
        .bind(&params.remote_id)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(write_err)?;

        self.get_group(&id).await
    }

    async fn get_group(&self, group_id: &GroupId) -> Result<Group, StoreError> {
        let row = sqlx::query_as::<_, GroupRow>(&format!(
            "SELECT {GROUP_COLUMNS} FROM groups g WHERE g.id = ?"
        ))
        .bind(group_id.0.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        match row {
            None => Err(StoreError::NotFound),
            Some(row) => group_from_row(row, false),
        }
    }

    async fn update_group(&self, group: &Group) -> Result<Group, StoreError> {
        let result = sqlx::query(
            "UPDATE groups SET name = ?, display_name = ?, description = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(&group.name)
        .bind(&group.display_name)
        .bind(&group.description)
        .bind(now_millis())
        .bind(group.id.0.to_string())
        .execute(&self.pool)
        .await
        .map_err(write_err)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        self.get_group(&group.id).await
    }

    async fn list_groups(
        &self,
        page: Page,
        opts: &GroupSearchOpts,
    ) -> Result<Vec<Group>, StoreError> {
        let mut qb = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {GROUP_COLUMNS} FROM groups g WHERE 1 = 1"
        ));
        push_group_filters(&mut qb, opts);
        push_order_and_page(&mut qb, Some(page));

        let rows: Vec<GroupRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(backend)?;
        rows.into_iter()
            .map(|row| group_from_row(row, opts.include_member_count))
            .collect()
    }

    async fn list_groups_by_channel(
        &self,
        channel_id: &ChannelId,
        page: Page,
    ) -> Result<Vec<Group>, StoreError> {
        let mut qb = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {GROUP_COLUMNS} FROM groups g
               JOIN group_syncables gs ON gs.group_id = g.id
              WHERE gs.syncable_type = 'channel' AND gs.deleted_at = 0 AND gs.syncable_id = "
        ));
        qb.push_bind(channel_id.0.to_string());
        push_group_filters(&mut qb, &GroupSearchOpts::default());
        push_order_and_page(&mut qb, Some(page));

        let rows: Vec<GroupRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(backend)?;
        rows.into_iter()
            .map(|row| group_from_row(row, false))
            .collect()
    }

    async fn list_groups_by_team(
        &self,
        team_id: &TeamId,
        page: Option<Page>,
        opts: &GroupSearchOpts,
    ) -> Result<Vec<Group>, StoreError> {
        let mut qb = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {GROUP_COLUMNS} FROM groups g
               JOIN group_syncables gs ON gs.group_id = g.id
              WHERE gs.syncable_type = 'team' AND gs.deleted_at = 0 AND gs.syncable_id = "
        ));
        qb.push_bind(team_id.0.to_string());
        push_group_filters(&mut qb, opts);
        push_order_and_page(&mut qb, page);

        let rows: Vec<GroupRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(backend)?;
        rows.into_iter()
            .map(|row| group_from_row(row, opts.include_member_count))
            .collect()
    }

    // ───────────────────────────── Users ──────────────────────────────

    async fn create_user(&self, params: &CreateUserParams) -> Result<User, StoreError> {
        let id = UserId::new();
        let now = now_millis();
        sqlx::query("INSERT INTO users(id, username, email, created_at) VALUES(?, ?, ?, ?)")
            .bind(id.0.to_string())
            .bind(&params.username)
            .bind(&params.email)
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(write_err)?;

        Ok(User {
            id,
            username: params.username.clone(),
            email: params.email.clone(),
            created_at: timestamp(now)?,
        })
    }

    // ───────────────────────────── Members ────────────────────────────

    async fn add_group_member(
        &self,
        group_id: &GroupId,
        user_id: &UserId,
    ) -> Result<GroupMember, StoreError> {
        let now = now_millis();
        let result = sqlx::query(
            "INSERT INTO group_members(group_id, user_id, created_at) VALUES(?, ?, ?)
             ON CONFLICT(group_id, user_id)
             DO UPDATE SET deleted_at = 0, created_at = excluded.created_at
             WHERE group_members.deleted_at != 0",
        )
        .bind(group_id.0.to_string())
        .bind(user_id.0.to_string())
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(write_err)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::AlreadyExists);
        }
        Ok(GroupMember {
            group_id: *group_id,
            user_id: *user_id,
            created_at: timestamp(now)?,
            deleted_at: None,
        })
    }

    async fn remove_group_member(
        &self,
        group_id: &GroupId,
        user_id: &UserId,
    ) -> Result<GroupMember, StoreError> {
        let now = now_millis();
        let row = sqlx::query_as::<_, (i64,)>(
            "UPDATE group_members SET deleted_at = ?
              WHERE group_id = ? AND user_id = ? AND deleted_at = 0
             RETURNING created_at",
        )
        .bind(now)
        .bind(group_id.0.to_string())
        .bind(user_id.0.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        let (created,) = row.ok_or(StoreError::NotFound)?;
        Ok(GroupMember {
            group_id: *group_id,
            user_id: *user_id,
            created_at: timestamp(created)?,
            deleted_at: tombstone(now)?,
        })
    }

    async fn page_group_member_users(
        &self,
        group_id: &GroupId,
        page: Page,
    ) -> Result<(Vec<User>, i64), StoreError> {
        // Count and slice from the same snapshot.
        let mut tx = self.pool.begin().await.map_err(backend)?;

        let (total,) = sqlx::query_as::<_, (i64,)>(
            "SELECT COUNT(*) FROM group_members m
               JOIN users u ON u.id = m.user_id
              WHERE m.group_id = ? AND m.deleted_at = 0",
        )
        .bind(group_id.0.to_string())
        .fetch_one(&mut *tx)
        .await
        .map_err(backend)?;

        let rows = sqlx::query_as::<_, UserRow>(
            "SELECT u.id, u.username, u.email, u.created_at
               FROM group_members m
               JOIN users u ON u.id = m.user_id
              WHERE m.group_id = ? AND m.deleted_at = 0
              ORDER BY u.username, u.id
              LIMIT ? OFFSET ?",
        )
        .bind(group_id.0.to_string())
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&mut *tx)
        .await
        .map_err(backend)?;

        tx.commit().await.map_err(backend)?;

        let users = rows
            .into_iter()
            .map(user_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((users, total))
    }
}

#[async_trait::async_trait]
impl SyncableStore for SqliteStore {
    async fn get_group_syncable(
        &self,
        group_id: &GroupId,
        syncable: &Syncable,
    ) -> Result<GroupSyncable, StoreError> {
        self.fetch_group_syncable(group_id, syncable).await
    }

    async fn create_group_syncable(
        &self,
        record: &GroupSyncable,
    ) -> Result<GroupSyncable, StoreError> {
        let now = now_millis();
        sqlx::query(
            "INSERT INTO group_syncables(group_id, syncable_id, syncable_type, auto_add, scheme_admin,
                                         created_at, updated_at, deleted_at)
             VALUES(?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(record.group_id.0.to_string())
        .bind(record.syncable.id().to_string())
        .bind(record.syncable.kind().as_str())
        .bind(record.auto_add)
        .bind(record.scheme_admin)
        .bind(now)
        .bind(now)
        .bind(tombstone_millis(record.deleted_at))
        .execute(&self.pool)
        .await
        .map_err(write_err)?;

        self.fetch_group_syncable(&record.group_id, &record.syncable)
            .await
    }

    async fn update_group_syncable(
        &self,
        record: &GroupSyncable,
    ) -> Result<GroupSyncable, StoreError> {
        let result = sqlx::query(
            "UPDATE group_syncables
                SET auto_add = ?, scheme_admin = ?, deleted_at = ?, updated_at = ?
              WHERE group_id = ? AND syncable_id = ? AND syncable_type = ?",
        )
        .bind(record.auto_add)
        .bind(record.scheme_admin)
        .bind(tombstone_millis(record.deleted_at))
        .bind(now_millis())
        .bind(record.group_id.0.to_string())
        .bind(record.syncable.id().to_string())
        .bind(record.syncable.kind().as_str())
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        self.fetch_group_syncable(&record.group_id, &record.syncable)
            .await
    }

    async fn delete_group_syncable(
        &self,
        group_id: &GroupId,
        syncable: &Syncable,
    ) -> Result<GroupSyncable, StoreError> {
        let now = now_millis();
        let result = sqlx::query(
            "UPDATE group_syncables SET deleted_at = ?, updated_at = ?
              WHERE group_id = ? AND syncable_id = ? AND syncable_type = ? AND deleted_at = 0",
        )
        .bind(now)
        .bind(now)
        .bind(group_id.0.to_string())
        .bind(syncable.id().to_string())
        .bind(syncable.kind().as_str())
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        self.fetch_group_syncable(group_id, syncable).await
    }

    async fn list_group_syncables(
        &self,
        group_id: &GroupId,
        syncable_type: SyncableType,
    ) -> Result<Vec<GroupSyncable>, StoreError> {
        let rows = sqlx::query_as::<_, SyncableRow>(&format!(
            "SELECT {SYNCABLE_COLUMNS} FROM group_syncables
              WHERE group_id = ? AND syncable_type = ? AND deleted_at = 0
              ORDER BY created_at, syncable_id"
        ))
        .bind(group_id.0.to_string())
        .bind(syncable_type.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        rows.into_iter().map(syncable_from_row).collect()
    }
}
