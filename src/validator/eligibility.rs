// self
use crate::{
	_prelude::*,
	config::{AsyncRequestPolicy, ValidatorConfig},
	request::{RequestContext, UserContext},
};

/// Reason the eligibility gate let a request through unchecked.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
	/// The method is configured as a form submission.
	SubmissionMethod,
	/// The request is asynchronous and the policy skips those.
	AsyncRequest,
	/// No authenticated user.
	Anonymous,
	/// The account is inactive.
	InactiveUser,
	/// The account has no usable email address.
	MissingEmail,
	/// The path is the provider callback or another exempt path.
	ExemptPath,
	/// The email domain is not subject to the check.
	DomainNotEligible,
}
impl SkipReason {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			SkipReason::SubmissionMethod => "submission_method",
			SkipReason::AsyncRequest => "async_request",
			SkipReason::Anonymous => "anonymous",
			SkipReason::InactiveUser => "inactive_user",
			SkipReason::MissingEmail => "missing_email",
			SkipReason::ExemptPath => "exempt_path",
			SkipReason::DomainNotEligible => "domain_not_eligible",
		}
	}
}
impl Display for SkipReason {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Runs the gate and returns the user to check, or why the request is skipped.
pub(crate) fn check<'r>(
	config: &ValidatorConfig,
	request: &'r RequestContext,
) -> Result<&'r UserContext, SkipReason> {
	if config.is_submission_method(&request.method) {
		return Err(SkipReason::SubmissionMethod);
	}
	if request.is_async && config.async_requests == AsyncRequestPolicy::Skip {
		return Err(SkipReason::AsyncRequest);
	}

	let user = request.user.as_ref().ok_or(SkipReason::Anonymous)?;

	if !user.is_active {
		return Err(SkipReason::InactiveUser);
	}

	let email = user.email().ok_or(SkipReason::MissingEmail)?;

	if config.is_exempt_path(&request.path) {
		return Err(SkipReason::ExemptPath);
	}
	if !config.is_eligible_email(email) {
		return Err(SkipReason::DomainNotEligible);
	}

	Ok(user)
}
