//! SQLite-backed store implementation.
//!
//! One [`tokio_rusqlite`] connection serializes access; every mutating
//! call runs in autocommit mode, so it commits as its own transaction
//! before returning and no transaction ever spans a driver call.

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{Row, params};
use tokio_rusqlite::Connection;

use stagehand_protocols::entity::{ActivityRecord, ObjectType, Service, Session, Step, StepDescription};
use stagehand_protocols::error::StoreError;
use stagehand_protocols::status::{Activity, ServiceStatus, SessionStatus};
use stagehand_protocols::workflow::{ServiceKind, ServiceSpec};

use crate::predicate::{Field, Predicate, ServiceField, SessionField, StepDescriptionField, StepField};
use crate::schema::init_schema;

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;

const SESSION_COLUMNS: &str =
    "SELECT id, name, workflow_name, user_name, start_time, end_time, status FROM session";
const SERVICE_COLUMNS: &str = "SELECT id, session_id, name, kind, location, targets, flavor, \
     namespace, mountpoint, storagesize, datanodes, start_time, end_time, status, jobid FROM service";
const STEP_DESCRIPTION_COLUMNS: &str =
    "SELECT id, session_id, name, command, service_id FROM step_description";
const STEP_COLUMNS: &str = "SELECT id, step_description_id, instance_name, start_time, stop_time, \
     status, progress, command, jobid FROM step";

/// Durable record storage for all control-plane entities.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open (and if needed create) the store at `path`; `":memory:"` opens
    /// an ephemeral store.
    ///
    /// An unwritable or unreachable location is a construction-time
    /// [`StoreError::PermissionDenied`]; nothing else can fail here.
    pub async fn open(path: &str) -> Result<Self, StoreError> {
        let conn = if path == ":memory:" {
            Connection::open_in_memory().await
        } else {
            Connection::open(path.to_string()).await
        }
        .map_err(|e| StoreError::PermissionDenied(format!("{path}: {e}")))?;

        // Creating the schema is the first write; a read-only file fails
        // here rather than on first use.
        conn.call(|conn| Ok(init_schema(conn)?))
            .await
            .map_err(|e| StoreError::PermissionDenied(format!("{path}: {e}")))?;

        tracing::info!(path, "opened store");
        Ok(Self { conn })
    }

    // ---- sessions ----

    pub async fn add_session(
        &self,
        name: &str,
        workflow_name: &str,
        user_name: &str,
        status: SessionStatus,
    ) -> Result<Session, StoreError> {
        let session = Session {
            id: 0,
            name: name.to_string(),
            workflow_name: workflow_name.to_string(),
            user_name: user_name.to_string(),
            start_time: Utc::now(),
            end_time: None,
            status,
        };
        let row = session.clone();
        let id = self
            .conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO session (name, workflow_name, user_name, start_time, end_time, status)
                     VALUES (?1, ?2, ?3, ?4, NULL, ?5)",
                    params![
                        row.name,
                        row.workflow_name,
                        row.user_name,
                        row.start_time.to_rfc3339(),
                        row.status.as_str()
                    ],
                )?;
                Ok(conn.last_insert_rowid())
            })
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;
        Ok(Session { id, ..session })
    }

    pub async fn find_sessions(
        &self,
        predicate: Predicate<SessionField>,
    ) -> Result<Vec<Session>, StoreError> {
        self.query_rows(SESSION_COLUMNS, predicate, session_from_row).await
    }

    /// Singular lookup: `Ok(None)` on zero matches, [`StoreError::NotUnique`]
    /// on more than one.
    pub async fn find_session(
        &self,
        predicate: Predicate<SessionField>,
    ) -> Result<Option<Session>, StoreError> {
        self.query_unique(SESSION_COLUMNS, predicate, session_from_row).await
    }

    pub async fn update_session_status(
        &self,
        id: i64,
        status: SessionStatus,
    ) -> Result<(), StoreError> {
        self.execute(
            "UPDATE session SET status = ?1 WHERE id = ?2",
            vec![text(status.as_str()), int(id)],
        )
        .await
    }

    pub async fn set_session_end_time(
        &self,
        id: i64,
        end_time: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        self.execute(
            "UPDATE session SET end_time = ?1 WHERE id = ?2",
            vec![text(&end_time.to_rfc3339()), int(id)],
        )
        .await
    }

    // ---- services ----

    /// Persist a service row at reservation time. Attribute fields the
    /// kind does not use stay empty.
    pub async fn add_service(
        &self,
        session_id: i64,
        spec: &ServiceSpec,
        status: ServiceStatus,
        jobid: Option<i64>,
    ) -> Result<Service, StoreError> {
        let attrs = &spec.attributes;
        let service = Service {
            id: 0,
            session_id,
            name: spec.name.clone(),
            kind: spec.kind,
            location: attrs.location.clone().unwrap_or_default(),
            targets: attrs.targets.clone().unwrap_or_default(),
            flavor: attrs.flavor.clone().unwrap_or_default(),
            namespace: attrs.namespace.clone().unwrap_or_default(),
            mountpoint: attrs.mountpoint.clone().unwrap_or_default(),
            storagesize: attrs.storagesize.clone().unwrap_or_default(),
            datanodes: attrs.datanodes.unwrap_or(1),
            start_time: Utc::now(),
            end_time: None,
            status,
            jobid,
        };
        let row = service.clone();
        let id = self
            .conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO service (session_id, name, kind, location, targets, flavor,
                        namespace, mountpoint, storagesize, datanodes, start_time, end_time,
                        status, jobid)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, NULL, ?12, ?13)",
                    params![
                        row.session_id,
                        row.name,
                        row.kind.as_str(),
                        row.location,
                        row.targets,
                        row.flavor,
                        row.namespace,
                        row.mountpoint,
                        row.storagesize,
                        row.datanodes,
                        row.start_time.to_rfc3339(),
                        row.status.as_str(),
                        row.jobid
                    ],
                )?;
                Ok(conn.last_insert_rowid())
            })
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;
        Ok(Service { id, ..service })
    }

    pub async fn find_services(
        &self,
        predicate: Predicate<ServiceField>,
    ) -> Result<Vec<Service>, StoreError> {
        self.query_rows(SERVICE_COLUMNS, predicate, service_from_row).await
    }

    pub async fn find_service(
        &self,
        predicate: Predicate<ServiceField>,
    ) -> Result<Option<Service>, StoreError> {
        self.query_unique(SERVICE_COLUMNS, predicate, service_from_row).await
    }

    pub async fn update_service_status(
        &self,
        id: i64,
        status: ServiceStatus,
    ) -> Result<(), StoreError> {
        self.execute(
            "UPDATE service SET status = ?1 WHERE id = ?2",
            vec![text(status.as_str()), int(id)],
        )
        .await
    }

    pub async fn update_service_jobid(&self, id: i64, jobid: i64) -> Result<(), StoreError> {
        self.execute(
            "UPDATE service SET jobid = ?1 WHERE id = ?2",
            vec![int(jobid), int(id)],
        )
        .await
    }

    pub async fn set_service_end_time(
        &self,
        id: i64,
        end_time: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        self.execute(
            "UPDATE service SET end_time = ?1 WHERE id = ?2",
            vec![text(&end_time.to_rfc3339()), int(id)],
        )
        .await
    }

    // ---- step descriptions ----

    pub async fn add_step_description(
        &self,
        session_id: i64,
        name: &str,
        command: &str,
        service_id: Option<i64>,
    ) -> Result<StepDescription, StoreError> {
        let description = StepDescription {
            id: 0,
            session_id,
            name: name.to_string(),
            command: command.to_string(),
            service_id,
        };
        let row = description.clone();
        let id = self
            .conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO step_description (session_id, name, command, service_id)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![row.session_id, row.name, row.command, row.service_id],
                )?;
                Ok(conn.last_insert_rowid())
            })
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;
        Ok(StepDescription { id, ..description })
    }

    pub async fn find_step_descriptions(
        &self,
        predicate: Predicate<StepDescriptionField>,
    ) -> Result<Vec<StepDescription>, StoreError> {
        self.query_rows(STEP_DESCRIPTION_COLUMNS, predicate, step_description_from_row)
            .await
    }

    pub async fn find_step_description(
        &self,
        predicate: Predicate<StepDescriptionField>,
    ) -> Result<Option<StepDescription>, StoreError> {
        self.query_unique(STEP_DESCRIPTION_COLUMNS, predicate, step_description_from_row)
            .await
    }

    // ---- steps ----

    pub async fn add_step(
        &self,
        step_description_id: i64,
        instance_name: &str,
        status: &str,
        command: &str,
    ) -> Result<Step, StoreError> {
        let step = Step {
            id: 0,
            step_description_id,
            instance_name: instance_name.to_string(),
            start_time: Utc::now(),
            stop_time: None,
            status: status.to_string(),
            progress: String::new(),
            command: command.to_string(),
            jobid: None,
        };
        let row = step.clone();
        let id = self
            .conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO step (step_description_id, instance_name, start_time, stop_time,
                        status, progress, command, jobid)
                     VALUES (?1, ?2, ?3, NULL, ?4, ?5, ?6, NULL)",
                    params![
                        row.step_description_id,
                        row.instance_name,
                        row.start_time.to_rfc3339(),
                        row.status,
                        row.progress,
                        row.command
                    ],
                )?;
                Ok(conn.last_insert_rowid())
            })
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;
        Ok(Step { id, ..step })
    }

    pub async fn find_steps(&self, predicate: Predicate<StepField>) -> Result<Vec<Step>, StoreError> {
        self.query_rows(STEP_COLUMNS, predicate, step_from_row).await
    }

    pub async fn find_step(
        &self,
        predicate: Predicate<StepField>,
    ) -> Result<Option<Step>, StoreError> {
        self.query_unique(STEP_COLUMNS, predicate, step_from_row).await
    }

    pub async fn update_step_status(&self, id: i64, status: &str) -> Result<(), StoreError> {
        self.execute(
            "UPDATE step SET status = ?1 WHERE id = ?2",
            vec![text(status), int(id)],
        )
        .await
    }

    /// Record the job backing a step. A step's jobid is immutable once
    /// assigned; assigning twice is an error.
    pub async fn assign_step_jobid(&self, id: i64, jobid: i64) -> Result<(), StoreError> {
        let changed = self
            .conn
            .call(move |conn| {
                Ok(conn.execute(
                    "UPDATE step SET jobid = ?1 WHERE id = ?2 AND jobid IS NULL",
                    params![jobid, id],
                )?)
            })
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;
        if changed == 0 {
            return Err(StoreError::Query(format!(
                "step {id} not found or jobid already assigned"
            )));
        }
        Ok(())
    }

    pub async fn update_step_progress(&self, id: i64, progress: &str) -> Result<(), StoreError> {
        self.execute(
            "UPDATE step SET progress = ?1 WHERE id = ?2",
            vec![text(progress), int(id)],
        )
        .await
    }

    pub async fn set_step_stop_time(
        &self,
        id: i64,
        stop_time: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        self.execute(
            "UPDATE step SET stop_time = ?1 WHERE id = ?2",
            vec![text(&stop_time.to_rfc3339()), int(id)],
        )
        .await
    }

    /// Remove a step row. Only used to undo a step whose job submission
    /// failed before a jobid existed.
    pub async fn delete_step(&self, id: i64) -> Result<(), StoreError> {
        self.execute("DELETE FROM step WHERE id = ?1", vec![int(id)]).await
    }

    // ---- activity log ----

    /// Append one record to the activity log. Records are never updated or
    /// deleted; ids are strictly increasing.
    pub async fn log_activity(
        &self,
        object_type: ObjectType,
        object_id: i64,
        activity: Activity,
    ) -> Result<ActivityRecord, StoreError> {
        let record = ActivityRecord {
            id: 0,
            object_type,
            object_id,
            activity,
            time: Utc::now(),
        };
        let row = record.clone();
        let id = self
            .conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO object_activity (object_type, object_id, activity, time)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![
                        row.object_type.as_str(),
                        row.object_id,
                        row.activity.as_str(),
                        row.time.to_rfc3339()
                    ],
                )?;
                Ok(conn.last_insert_rowid())
            })
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;
        Ok(ActivityRecord { id, ..record })
    }

    /// The whole activity log, in insertion order.
    pub async fn activities(&self) -> Result<Vec<ActivityRecord>, StoreError> {
        self.conn
            .call(|conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, object_type, object_id, activity, time FROM object_activity ORDER BY id",
                )?;
                let rows = stmt
                    .query_map([], activity_from_row)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(rows)
            })
            .await
            .map_err(|e| StoreError::Query(e.to_string()))
    }

    // ---- shared plumbing ----

    async fn execute(
        &self,
        sql: &'static str,
        args: Vec<rusqlite::types::Value>,
    ) -> Result<(), StoreError> {
        self.conn
            .call(move |conn| {
                conn.execute(sql, rusqlite::params_from_iter(args))?;
                Ok(())
            })
            .await
            .map_err(|e| StoreError::Query(e.to_string()))
    }

    async fn query_rows<T, F>(
        &self,
        columns: &'static str,
        predicate: Predicate<F>,
        map: fn(&Row<'_>) -> rusqlite::Result<T>,
    ) -> Result<Vec<T>, StoreError>
    where
        T: Send + 'static,
        F: Field + Send + 'static,
    {
        let sql = format!("{columns}{}", predicate.where_sql());
        let args = predicate.params();
        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt
                    .query_map(rusqlite::params_from_iter(args), map)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(rows)
            })
            .await
            .map_err(|e| StoreError::Query(e.to_string()))
    }

    async fn query_unique<T, F>(
        &self,
        columns: &'static str,
        predicate: Predicate<F>,
        map: fn(&Row<'_>) -> rusqlite::Result<T>,
    ) -> Result<Option<T>, StoreError>
    where
        T: Send + 'static,
        F: Field + Send + 'static,
    {
        let description = predicate.describe();
        let mut rows = self.query_rows(columns, predicate, map).await?;
        match rows.len() {
            0 => Ok(None),
            1 => Ok(rows.pop()),
            _ => Err(StoreError::NotUnique(description)),
        }
    }
}

fn text(value: &str) -> rusqlite::types::Value {
    rusqlite::types::Value::Text(value.to_string())
}

fn int(value: i64) -> rusqlite::types::Value {
    rusqlite::types::Value::Integer(value)
}

fn conversion_err(idx: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, message.into())
}

fn parse_time(idx: usize, value: String) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| conversion_err(idx, format!("bad timestamp {value:?}: {e}")))
}

fn parse_opt_time(idx: usize, value: Option<String>) -> rusqlite::Result<Option<DateTime<Utc>>> {
    value.map(|v| parse_time(idx, v)).transpose()
}

fn session_from_row(row: &Row<'_>) -> rusqlite::Result<Session> {
    let status: String = row.get(6)?;
    Ok(Session {
        id: row.get(0)?,
        name: row.get(1)?,
        workflow_name: row.get(2)?,
        user_name: row.get(3)?,
        start_time: parse_time(4, row.get(4)?)?,
        end_time: parse_opt_time(5, row.get(5)?)?,
        status: SessionStatus::parse(&status)
            .ok_or_else(|| conversion_err(6, format!("unknown session status {status:?}")))?,
    })
}

fn service_from_row(row: &Row<'_>) -> rusqlite::Result<Service> {
    let kind: String = row.get(3)?;
    let status: String = row.get(13)?;
    Ok(Service {
        id: row.get(0)?,
        session_id: row.get(1)?,
        name: row.get(2)?,
        kind: ServiceKind::parse(&kind)
            .ok_or_else(|| conversion_err(3, format!("unknown service kind {kind:?}")))?,
        location: row.get(4)?,
        targets: row.get(5)?,
        flavor: row.get(6)?,
        namespace: row.get(7)?,
        mountpoint: row.get(8)?,
        storagesize: row.get(9)?,
        datanodes: row.get(10)?,
        start_time: parse_time(11, row.get(11)?)?,
        end_time: parse_opt_time(12, row.get(12)?)?,
        status: ServiceStatus::parse(&status)
            .ok_or_else(|| conversion_err(13, format!("unknown service status {status:?}")))?,
        jobid: row.get(14)?,
    })
}

fn step_description_from_row(row: &Row<'_>) -> rusqlite::Result<StepDescription> {
    Ok(StepDescription {
        id: row.get(0)?,
        session_id: row.get(1)?,
        name: row.get(2)?,
        command: row.get(3)?,
        service_id: row.get(4)?,
    })
}

fn step_from_row(row: &Row<'_>) -> rusqlite::Result<Step> {
    Ok(Step {
        id: row.get(0)?,
        step_description_id: row.get(1)?,
        instance_name: row.get(2)?,
        start_time: parse_time(3, row.get(3)?)?,
        stop_time: parse_opt_time(4, row.get(4)?)?,
        status: row.get(5)?,
        progress: row.get(6)?,
        command: row.get(7)?,
        jobid: row.get(8)?,
    })
}

fn activity_from_row(row: &Row<'_>) -> rusqlite::Result<ActivityRecord> {
    let object_type: String = row.get(1)?;
    let activity: String = row.get(3)?;
    Ok(ActivityRecord {
        id: row.get(0)?,
        object_type: ObjectType::parse(&object_type)
            .ok_or_else(|| conversion_err(1, format!("unknown object type {object_type:?}")))?,
        object_id: row.get(2)?,
        activity: Activity::parse(&activity)
            .ok_or_else(|| conversion_err(3, format!("unknown activity {activity:?}")))?,
        time: parse_time(4, row.get(4)?)?,
    })
}
