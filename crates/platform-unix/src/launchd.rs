//! Parsing of `launchctl blame` output

use witr_core::ServiceLabel;

/// Parse the service target printed by `launchctl blame <pid>`
///
/// `system/com.example.daemon` yields label `com.example.daemon` in domain
/// `system`; `gui/501/com.example.app` yields domain `gui/501`. Output with no
/// `/` carries no service.
pub fn parse_blame(output: &str) -> Option<ServiceLabel> {
    let line = output.lines().map(str::trim).find(|l| !l.is_empty())?;
    let (domain, label) = line.rsplit_once('/')?;
    if domain.is_empty() || label.is_empty() {
        return None;
    }
    Some(ServiceLabel {
        label: label.to_string(),
        domain: domain.to_string(),
    })
}
