use serde::Serialize;

use crate::middleware::{ApiResponse, ApiResult};
use crate::security::{CallerContext, Permission};

#[derive(Debug, Serialize)]
pub struct WhoAmI {
    pub user_id: u64,
    pub filiale_id: Option<u64>,
    pub permissions: Vec<Permission>,
}

/// GET /auth/me - Identity and scope carried by the caller's token
///
/// ```json
/// {
///   "success": true,
///   "message": "Utilisateur courant",
///   "data": { "user_id": 3, "filiale_id": 7, "permissions": ["filiales.view"] }
/// }
/// ```
pub async fn me(caller: CallerContext) -> ApiResult<WhoAmI> {
    let user_id = caller.require_user()?;

    Ok(ApiResponse::success(
        WhoAmI {
            user_id,
            filiale_id: caller.filiale_id,
            permissions: caller.permissions.into_iter().collect(),
        },
        "Utilisateur courant",
    ))
}
