use crate::config::{ACCOUNT_ID_VAR, API_TOKEN_VAR};
use crate::context::Context;
use crate::platform::{AuthStatus, LOGIN_COMMAND, Wrangler};
use anyhow::Result;

/// How the platform credentials were established
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthMethod {
    /// API token and account id from the environment; the CLI is not consulted
    EnvironmentToken,
    /// An interactive `wrangler login` session
    CliSession,
}

/// Check that deploys to the platform are authenticated
pub fn check_auth(ctx: &Context) -> Result<Option<AuthMethod>> {
    ctx.output.subsection("Authentication");

    if ctx.env.var(API_TOKEN_VAR).is_some() && ctx.env.var(ACCOUNT_ID_VAR).is_some() {
        ctx.output.success(&format!(
            "Using API token from {} and {}",
            API_TOKEN_VAR, ACCOUNT_ID_VAR
        ));
        return Ok(Some(AuthMethod::EnvironmentToken));
    }

    match Wrangler::new(ctx).whoami()? {
        AuthStatus::Authenticated => {
            ctx.output.success("Authenticated with wrangler");
            Ok(Some(AuthMethod::CliSession))
        }
        AuthStatus::NotAuthenticated => {
            ctx.output.error("Not authenticated with wrangler");
            ctx.output.hint("Log in with", LOGIN_COMMAND);
            Ok(None)
        }
        AuthStatus::Unavailable(diagnostic) => {
            ctx.output.error("Could not check wrangler authentication");
            if !diagnostic.is_empty() {
                ctx.output.dimmed(&diagnostic);
            }
            ctx.output.hint("Log in with", LOGIN_COMMAND);
            Ok(None)
        }
    }
}
