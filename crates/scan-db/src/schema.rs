/// Safe to apply on every open: every statement is `IF NOT EXISTS`.
pub const SCHEMA: &str = r#"
BEGIN;

CREATE TABLE IF NOT EXISTS scans (
  id              INTEGER PRIMARY KEY,
  scan_time       TEXT NOT NULL,
  scanner_version TEXT,
  raw_file        TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS hosts (
  id              INTEGER PRIMARY KEY,
  scan_id         INTEGER NOT NULL REFERENCES scans(id),
  ip              TEXT,
  hostname        TEXT,
  status          TEXT,
  os              TEXT,
  ttl             INTEGER,
  raw             TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS ports (
  id              INTEGER PRIMARY KEY,
  host_id         INTEGER NOT NULL REFERENCES hosts(id),
  port            INTEGER,
  protocol        TEXT,
  service         TEXT,
  state           TEXT,
  banner          TEXT,
  cpe             TEXT,
  raw             TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS vulnerabilities (
  id              INTEGER PRIMARY KEY,
  scan_id         INTEGER NOT NULL REFERENCES scans(id),
  host_id         INTEGER NOT NULL REFERENCES hosts(id),
  port_id         INTEGER REFERENCES ports(id),
  cve             TEXT,
  note            TEXT,
  raw             TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_hosts_ip ON hosts(ip);
CREATE INDEX IF NOT EXISTS idx_ports_host ON ports(host_id);
CREATE INDEX IF NOT EXISTS idx_vuln_cve ON vulnerabilities(cve);
CREATE INDEX IF NOT EXISTS idx_vuln_host ON vulnerabilities(host_id);

COMMIT;
"#;

/// Tables created by [`SCHEMA`], parents first.
pub const TABLES: &[&str] = &["scans", "hosts", "ports", "vulnerabilities"];
