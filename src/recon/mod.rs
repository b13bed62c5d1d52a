//! External collaborators used by the non-discovery modes.
//!
//! Each collaborator sits behind a trait with a single call/result contract
//! so the CLI never depends on a particular implementation:
//!
//! - [`dns::Resolver`] - hostname to addresses
//! - [`whois::WhoisLookup`] - registration data
//! - [`ports::PortScanEngine`] - open TCP ports
//! - [`tech::Fingerprinter`] - web technologies

pub mod dns;
pub mod info;
pub mod ports;
pub mod tech;
pub mod whois;

pub use dns::{DnsResolver, Resolver};
pub use info::DomainInfo;
pub use ports::{HostReport, PortScanEngine, PortState, TcpConnectEngine};
pub use tech::{Fingerprinter, HeaderFingerprinter, TechSection, WhatWeb};
pub use whois::{WhoisClient, WhoisLookup, WhoisRecord};
