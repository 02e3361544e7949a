mod scenario;

use crate::Request;

/// A request from `account` carrying one value per condition key.
pub(crate) fn request_with(
    account: &str,
    action: &str,
    bucket: &str,
    object: &str,
    values: &[(&str, &str)],
) -> Request {
    values.iter().fold(
        Request::new(account, action, bucket).with_object(object),
        |request, (key, value)| request.with_condition_value(*key, *value),
    )
}
