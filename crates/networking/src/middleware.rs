//! Per-response CSP header resolution.
//!
//! For each configured header kind the middleware resolves the base policy,
//! folds in any override the handler attached to the response, compiles the
//! result and sets the header. A policy that fails to compile is logged and
//! the header is left off; the response itself is never rejected.

use citadel_csp::{compile, resolve_override, Policy, CSP_HEADER, CSP_REPORT_ONLY_HEADER};

use crate::config::CspConfig;
use crate::error::{MiddlewareError, MiddlewareResult};
use crate::request::Request;
use crate::response::{OverrideSlot, Response};
use crate::source::{PolicySource, ResolvedPolicy};

/// Sets `Content-Security-Policy` and `Content-Security-Policy-Report-Only`
/// headers on outgoing responses
#[derive(Debug, Clone)]
pub struct CspMiddleware {
    enforced: Option<PolicySource>,
    report_only: Option<PolicySource>,
}

impl CspMiddleware {
    /// Build the middleware from configuration.
    ///
    /// Returns [`MiddlewareError::NotUsed`] when neither header has a base
    /// policy; empty policies count as unset.
    pub fn new(config: CspConfig) -> MiddlewareResult<Self> {
        let enforced = config.enforced.filter(PolicySource::is_configured);
        let report_only = config.report_only.filter(PolicySource::is_configured);

        if enforced.is_none() && report_only.is_none() {
            return Err(MiddlewareError::NotUsed);
        }

        log::debug!(
            "CSP middleware enabled (enforced: {}, report-only: {})",
            enforced.is_some(),
            report_only.is_some()
        );
        Ok(Self { enforced, report_only })
    }

    /// Override slots consulted for the report-only header, in order.
    ///
    /// The general slot only applies to the report-only header when there is
    /// no enforced header for it to belong to.
    fn report_only_slots(&self) -> &'static [OverrideSlot] {
        if self.enforced.is_some() {
            &[OverrideSlot::CspReport]
        } else {
            &[OverrideSlot::CspReport, OverrideSlot::Csp]
        }
    }

    /// Add the configured CSP headers to a response
    pub fn process(&self, request: &Request, mut response: Response) -> Response {
        if let Some(base) = &self.enforced {
            add_csp_header(request, &mut response, CSP_HEADER, base, &[OverrideSlot::Csp]);
        }
        if let Some(base) = &self.report_only {
            add_csp_header(
                request,
                &mut response,
                CSP_REPORT_ONLY_HEADER,
                base,
                self.report_only_slots(),
            );
        }
        response
    }
}

fn add_csp_header(
    request: &Request,
    response: &mut Response,
    header: &str,
    base: &PolicySource,
    slots: &[OverrideSlot],
) {
    if response.has_header(header) {
        log::trace!("{} already set for {}, leaving it alone", header, request.full_path());
        return;
    }

    let policy = match base.resolve(request, response) {
        ResolvedPolicy::Raw(value) => {
            response.set_header(header, value);
            return;
        }
        ResolvedPolicy::Structured(policy) => apply_override(policy, response, slots),
    };

    if policy.is_empty() {
        return;
    }

    match compile(&policy) {
        Ok(value) => response.set_header(header, &value),
        Err(err) => {
            log::error!(
                "Invalid CSP on page {} {}: {}",
                request.method(),
                request.full_path(),
                err
            );
        }
    }
}

/// The first slot holding an override wins, even if that override is empty.
fn apply_override(base: Policy, response: &Response, slots: &[OverrideSlot]) -> Policy {
    slots
        .iter()
        .find_map(|slot| response.csp_override(*slot))
        .map(|overrides| resolve_override(&base, overrides))
        .unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Method;
    use pretty_assertions::assert_eq;

    fn request() -> Request {
        Request::new(Method::GET, "https://dmoj.ca/").unwrap()
    }

    #[test]
    fn test_not_used_without_policies() {
        let result = CspMiddleware::new(CspConfig::new());
        assert!(matches!(result, Err(MiddlewareError::NotUsed)));

        let result = CspMiddleware::new(CspConfig::new().with_enforced(Policy::new()));
        assert!(result.unwrap_err().is_not_used());
    }

    #[test]
    fn test_report_only_slots() {
        let enforced = CspMiddleware::new(
            CspConfig::new()
                .with_enforced(PolicySource::raw("default-src 'self'"))
                .with_report_only(PolicySource::raw("default-src 'none'")),
        )
        .unwrap();
        assert_eq!(enforced.report_only_slots(), &[OverrideSlot::CspReport]);

        let report_only =
            CspMiddleware::new(CspConfig::new().with_report_only(PolicySource::raw("default-src 'none'")))
                .unwrap();
        assert_eq!(
            report_only.report_only_slots(),
            &[OverrideSlot::CspReport, OverrideSlot::Csp]
        );
    }

    #[test]
    fn test_apply_override_without_slot_keeps_base() {
        let base = Policy::new().with("default-src", vec!["self"]);
        let response = Response::new(200);
        assert_eq!(apply_override(base.clone(), &response, &[OverrideSlot::Csp]), base);
    }

    #[test]
    fn test_empty_override_still_claims_slot() {
        let base = Policy::new().with("default-src", vec!["self"]);
        let response = Response::new(200)
            .with_csp_report(Policy::new())
            .with_csp(Policy::new().with("default-src", vec!["none"]));

        let resolved = apply_override(base.clone(), &response, &[OverrideSlot::CspReport, OverrideSlot::Csp]);
        assert_eq!(resolved, base);
    }
}
