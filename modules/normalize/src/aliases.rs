//! Ordered key aliases for the fields scanners name differently.
//!
//! For every canonical field the first key that is present with a non-null
//! value wins.

use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostField {
    Ip,
    Hostname,
    Status,
    Os,
    Ttl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortField {
    Number,
    Protocol,
    Service,
    State,
    Banner,
    Cpe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VulnField {
    Id,
    Note,
}

pub type AliasTable<F> = &'static [(F, &'static [&'static str])];

pub const HOST_ALIASES: AliasTable<HostField> = &[
    (HostField::Ip, &["ip", "address", "target", "host"]),
    (HostField::Hostname, &["hostname", "hostnames"]),
    (HostField::Status, &["status", "state"]),
    (HostField::Os, &["os"]),
    (HostField::Ttl, &["ttl"]),
];

pub const PORT_ALIASES: AliasTable<PortField> = &[
    (PortField::Number, &["port", "portnumber", "port_id"]),
    (PortField::Protocol, &["protocol", "proto"]),
    (PortField::Service, &["service", "name"]),
    (PortField::State, &["state", "status"]),
    (PortField::Banner, &["banner", "product", "version"]),
    (PortField::Cpe, &["cpes"]),
];

/// Keys of a structured vulnerability entry.
pub const VULN_ALIASES: AliasTable<VulnField> = &[
    (VulnField::Id, &["cve", "id", "name"]),
    (VulnField::Note, &["note", "summary", "title"]),
];

/// Record keys holding the host's port list.
pub const PORT_LIST_KEYS: &[&str] = &["ports"];

/// Record keys holding the host's vulnerabilities.
pub const VULN_LIST_KEYS: &[&str] = &["vulns", "vulnerabilities"];

pub fn keys_for<F: PartialEq + Copy>(table: AliasTable<F>, field: F) -> &'static [&'static str] {
    table
        .iter()
        .find(|(f, _)| *f == field)
        .map(|(_, keys)| *keys)
        .unwrap_or(&[])
}

/// First of `keys` present in `obj` with a non-null value.
pub fn first_present<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| obj.get(*k))
        .find(|v| !v.is_null())
}

pub fn lookup<'a, F: PartialEq + Copy>(
    table: AliasTable<F>,
    obj: &'a Map<String, Value>,
    field: F,
) -> Option<&'a Value> {
    first_present(obj, keys_for(table, field))
}
