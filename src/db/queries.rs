pub const STATUS: &str = "SELECT @@SERVERNAME AS serverName, @@VERSION AS serverVersion, DB_NAME() AS currentDatabase, @@SPID AS sessionId, CONVERT(varchar(33), SYSDATETIMEOFFSET(), 127) AS currentTime";

/// One row per (session, lock) for every session that is blocked or blocking.
/// `@P1` optionally filters on database name.
pub const LOCK_ROWS: &str = r#"
WITH involved AS (
    SELECT r.session_id FROM sys.dm_exec_requests r WHERE r.blocking_session_id <> 0
    UNION
    SELECT r.blocking_session_id FROM sys.dm_exec_requests r WHERE r.blocking_session_id <> 0
)
SELECT
    CAST(s.session_id AS bigint) AS id,
    CAST(NULLIF(r.blocking_session_id, 0) AS bigint) AS holderId,
    s.login_name AS login,
    s.host_name AS host,
    s.program_name AS program,
    DB_NAME(COALESCE(r.database_id, s.database_id)) AS databaseName,
    r.command AS command,
    COALESCE(r.status, s.status) AS status,
    r.wait_type AS waitType,
    CAST(r.wait_time AS bigint) AS waitTimeMs,
    r.wait_resource AS waitResource,
    l.resource_type AS resourceType,
    l.request_mode AS lockMode,
    CASE
        WHEN l.resource_type = 'OBJECT'
            THEN OBJECT_SCHEMA_NAME(l.resource_associated_entity_id, l.resource_database_id)
                + '.' + OBJECT_NAME(l.resource_associated_entity_id, l.resource_database_id)
        ELSE OBJECT_SCHEMA_NAME(p.object_id, l.resource_database_id)
                + '.' + OBJECT_NAME(p.object_id, l.resource_database_id)
    END AS objectName
FROM involved i
JOIN sys.dm_exec_sessions s ON s.session_id = i.session_id
LEFT JOIN sys.dm_exec_requests r ON r.session_id = s.session_id
LEFT JOIN sys.dm_tran_locks l
    ON l.request_session_id = s.session_id AND l.resource_type <> 'DATABASE'
LEFT JOIN sys.partitions p ON p.hobt_id = l.resource_associated_entity_id
WHERE (@P1 IS NULL OR DB_NAME(COALESCE(r.database_id, s.database_id)) = @P1)
ORDER BY s.session_id, l.request_status, l.resource_type;
"#;

/// Locks requested or granted to one session (`@P1`).
pub const LOCK_ITEMS: &str = r#"
SELECT
    CAST(l.request_session_id AS bigint) AS sessionId,
    l.resource_type AS resourceType,
    l.resource_description AS resourceDescription,
    l.request_mode AS requestMode,
    l.request_status AS requestStatus,
    CASE
        WHEN l.resource_type = 'OBJECT'
            THEN OBJECT_SCHEMA_NAME(l.resource_associated_entity_id, l.resource_database_id)
                + '.' + OBJECT_NAME(l.resource_associated_entity_id, l.resource_database_id)
        ELSE OBJECT_SCHEMA_NAME(p.object_id, l.resource_database_id)
                + '.' + OBJECT_NAME(p.object_id, l.resource_database_id)
    END AS objectName
FROM sys.dm_tran_locks l
LEFT JOIN sys.partitions p ON p.hobt_id = l.resource_associated_entity_id
WHERE l.request_session_id = @P1
ORDER BY l.request_status DESC, l.resource_type;
"#;

pub const SESSIONS: &str = r#"
SELECT TOP (@P6)
    CAST(s.session_id AS bigint) AS sessionId,
    s.login_name AS loginName,
    s.host_name AS hostName,
    s.program_name AS programName,
    DB_NAME(s.database_id) AS databaseName,
    COALESCE(r.status, s.status) AS status,
    r.command AS command,
    r.wait_type AS waitType,
    CAST(NULLIF(r.blocking_session_id, 0) AS bigint) AS blockedBy,
    CAST(r.total_elapsed_time AS bigint) AS elapsedMs,
    CAST(s.transaction_isolation_level AS bigint) AS isolationLevel,
    CONVERT(varchar(33), s.login_time, 126) AS loginTime,
    t.text AS activeQuery
FROM sys.dm_exec_sessions s
LEFT JOIN sys.dm_exec_requests r ON s.session_id = r.session_id
OUTER APPLY sys.dm_exec_sql_text(r.sql_handle) t
WHERE s.is_user_process = 1
  AND (@P1 IS NULL OR DB_NAME(s.database_id) = @P1)
  AND (@P2 IS NULL OR s.login_name = @P2)
  AND (@P3 IS NULL OR s.host_name = @P3)
  AND (@P4 IS NULL OR s.status = @P4)
  AND (@P5 = 0
       OR r.blocking_session_id <> 0
       OR s.session_id IN (SELECT blocking_session_id FROM sys.dm_exec_requests))
ORDER BY r.total_elapsed_time DESC, s.session_id;
"#;

/// `KILL` takes no parameters, so the id is formatted into the statement.
pub fn kill_session(id: i64) -> String {
    format!("KILL {}", id)
}
