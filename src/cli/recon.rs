//! Collaborator-backed modes: basic info, port scan and tech scan.
//!
//! Collaborator failures are reported here and never abort the process.

use crate::config::AppSettings;
use crate::error::CliResult;
use crate::output;
use crate::recon::tech::{self, Fingerprinter};
use crate::recon::{
    DnsResolver, DomainInfo, HeaderFingerprinter, PortScanEngine, TcpConnectEngine, WhatWeb,
    WhoisClient,
};
use crate::types::{PortSpec, Target};
use std::sync::Arc;

/// Print the target's addresses and WHOIS data.
pub async fn basic_info(target: &Target, settings: &AppSettings) -> CliResult<()> {
    let resolver = DnsResolver::new();
    let whois = WhoisClient::new(settings.whois_server.clone(), settings.whois_timeout());

    let info = DomainInfo::gather(target.host(), &resolver, &whois).await;
    print!("{}", info);
    Ok(())
}

/// Scan the target's TCP ports and list the open ones.
pub async fn port_scan(
    target: &Target,
    ports: Option<&str>,
    settings: &AppSettings,
) -> CliResult<()> {
    let spec: PortSpec = ports.unwrap_or(settings.default_ports.as_str()).parse()?;

    let engine = TcpConnectEngine::new(
        Arc::new(DnsResolver::new()),
        settings.port_timeout(),
        settings.port_concurrency,
    );

    match engine.scan(target.host(), &spec).await {
        Ok(reports) => {
            for line in reports.iter().flat_map(|r| r.lines()) {
                println!("{}", line);
            }
        }
        Err(e) => println!("An error occurred during port scan: {}", e),
    }
    Ok(())
}

/// Fingerprint the target with the built-in matcher and `whatweb`.
pub async fn tech_scan(target: &Target, settings: &AppSettings) -> CliResult<()> {
    let mut fingerprinters: Vec<Box<dyn Fingerprinter>> = Vec::with_capacity(2);
    match HeaderFingerprinter::new(settings.fetch_timeout()) {
        Ok(builtin) => fingerprinters.push(Box::new(builtin)),
        Err(e) => output::print_warning(&format!("built-in fingerprinter unavailable: {}", e)),
    }
    fingerprinters.push(Box::new(WhatWeb::new(
        settings.whatweb_program.clone(),
        settings.fetch_timeout() * 6,
    )));

    let sections = tech::analyze(target.url(), &fingerprinters).await;

    println!("Detected Software:");
    println!("=================================");
    for (i, section) in sections.iter().enumerate() {
        if i > 0 {
            println!("---------------------------------");
        }
        match &section.result {
            Ok(lines) => {
                for line in lines {
                    println!("{}", line);
                }
            }
            Err(e) => output::print_warning(&format!("{}: {}", section.source, e)),
        }
    }
    Ok(())
}
