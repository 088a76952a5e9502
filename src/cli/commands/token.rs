use anyhow::Context;
use clap::Args;
use serde_json::json;

use crate::auth::{Claims, JwtKeys};
use crate::cli::{utils::output_success, OutputFormat};
use crate::config::config;
use crate::security::Permission;

#[derive(Debug, Args)]
pub struct TokenArgs {
    #[arg(long, help = "User id placed in the `sub` claim")]
    pub user: u64,

    #[arg(long, help = "Branch the caller is scoped to")]
    pub filiale: Option<u64>,

    #[arg(long = "permission", help = "Permission code (repeatable), e.g. filiales.view")]
    pub permissions: Vec<String>,

    #[arg(long, help = "Grant every known permission")]
    pub all_permissions: bool,
}

pub fn handle(args: TokenArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let permissions = resolve_permissions(&args)?;
    let config = config();
    if config.security.jwt_secret.is_empty() {
        anyhow::bail!("JWT_SECRET is empty; cannot sign a token");
    }

    let claims = Claims::new(
        Some(args.user),
        args.filiale,
        permissions.clone(),
        config.security.jwt_expiry_hours,
    );
    let token = JwtKeys::new(config.security.jwt_secret.clone())
        .generate(&claims)
        .context("failed to sign token")?;

    match output_format {
        OutputFormat::Json => output_success(
            output_format,
            "Token generated",
            json!({
                "token": token,
                "user_id": args.user,
                "filiale_id": args.filiale,
                "permissions": permissions,
                "expires_at": claims.exp,
            }),
        ),
        OutputFormat::Text => output_success(output_format, "Token generated", json!(token)),
    }
}

/// Permission codes to embed, rejecting unknown ones early
fn resolve_permissions(args: &TokenArgs) -> anyhow::Result<Vec<String>> {
    if args.all_permissions {
        return Ok(Permission::ALL.iter().map(|p| p.code().to_string()).collect());
    }

    args.permissions
        .iter()
        .map(|code| {
            code.parse::<Permission>()
                .map(|p| p.code().to_string())
                .with_context(|| format!("invalid --permission value '{}'", code))
        })
        .collect()
}
