//! Database schema initialization.

use rusqlite::Connection;

/// Create all tables if they do not exist yet.
///
/// The activity log uses AUTOINCREMENT so that record ids are strictly
/// increasing and never reused, which is what makes the log monotonic.
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS session (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            workflow_name TEXT NOT NULL,
            user_name TEXT NOT NULL,
            start_time TEXT NOT NULL,
            end_time TEXT,
            status TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS service (
            id INTEGER PRIMARY KEY,
            session_id INTEGER NOT NULL REFERENCES session(id),
            name TEXT NOT NULL,
            kind TEXT NOT NULL,
            location TEXT NOT NULL DEFAULT '',
            targets TEXT NOT NULL DEFAULT '',
            flavor TEXT NOT NULL DEFAULT '',
            namespace TEXT NOT NULL DEFAULT '',
            mountpoint TEXT NOT NULL DEFAULT '',
            storagesize TEXT NOT NULL DEFAULT '',
            datanodes INTEGER NOT NULL DEFAULT 1,
            start_time TEXT NOT NULL,
            end_time TEXT,
            status TEXT NOT NULL,
            jobid INTEGER
        );

        CREATE TABLE IF NOT EXISTS step_description (
            id INTEGER PRIMARY KEY,
            session_id INTEGER NOT NULL REFERENCES session(id),
            name TEXT NOT NULL,
            command TEXT NOT NULL,
            service_id INTEGER
        );

        CREATE TABLE IF NOT EXISTS step (
            id INTEGER PRIMARY KEY,
            step_description_id INTEGER NOT NULL REFERENCES step_description(id),
            instance_name TEXT NOT NULL,
            start_time TEXT NOT NULL,
            stop_time TEXT,
            status TEXT NOT NULL,
            progress TEXT NOT NULL DEFAULT '',
            command TEXT NOT NULL,
            jobid INTEGER
        );

        CREATE TABLE IF NOT EXISTS object_activity (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            object_type TEXT NOT NULL,
            object_id INTEGER NOT NULL,
            activity TEXT NOT NULL,
            time TEXT NOT NULL
        );",
    )
}
