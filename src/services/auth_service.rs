//! 认证服务：登录与首次访问账户创建

use crate::{
    auth::{
        context::{Principal, SecurityContext},
        jwt::JwtService,
        password::PasswordHasher,
    },
    config::AppConfig,
    db::Db,
    error::AppError,
    models::{role::Role, user::Credential},
    repository::{role_repo::RoleRepository, user_repo::UserRepository},
    services::identity_service::{check_account_status, AuthClaims, IdentityResolver},
};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Result of a successful login
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub token: String,
    pub claims: AuthClaims,
    /// Authenticated context for the remainder of the login request
    pub context: SecurityContext,
}

pub struct AuthService {
    db: Db,
    jwt_service: Arc<JwtService>,
    password_hasher: PasswordHasher,
    identity_resolver: IdentityResolver,
    config: Arc<AppConfig>,
    /// Verified against when the user does not exist, so both paths pay for Argon2
    dummy_hash: String,
}

impl AuthService {
    pub fn new(
        db: Db,
        jwt_service: Arc<JwtService>,
        password_hasher: PasswordHasher,
        config: Arc<AppConfig>,
    ) -> Result<Self, AppError> {
        let dummy_hash = password_hasher.hash(&PasswordHasher::generate_placeholder_password())?;

        Ok(Self {
            identity_resolver: IdentityResolver::new(db.clone()),
            db,
            jwt_service,
            password_hasher,
            config,
            dummy_hash,
        })
    }

    /// 用户登录
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginOutcome, AppError> {
        // 获取用户；不存在与密码错误对外表现一致
        let account = match self.identity_resolver.load_account(username).await {
            Ok(account) => account,
            Err(AppError::NotFound(_)) => {
                self.password_hasher
                    .verify_blocking(password.to_string(), self.dummy_hash.clone())
                    .await?;
                record_login(LoginResult::UnknownUser);
                tracing::warn!(username = %username, "Login failed: unknown user");
                return Err(AppError::InvalidCredentials);
            }
            Err(e) => return Err(e),
        };

        // 验证密码
        let matches = self
            .password_hasher
            .verify_blocking(password.to_string(), account.credential.password_hash.clone())
            .await?;
        if !matches {
            record_login(LoginResult::BadPassword);
            tracing::warn!(username = %username, "Login failed: wrong password");
            return Err(AppError::InvalidCredentials);
        }

        // 检查账户状态（密码正确后才暴露）
        if let Err(e) = check_account_status(&account.credential) {
            record_login(LoginResult::AccountStatus);
            tracing::warn!(username = %username, reason = %e, "Login refused by account status");
            return Err(e);
        }

        // 生成令牌
        let token = self
            .jwt_service
            .issue(&account.claims.username, &account.claims.authorities)?;

        record_login(LoginResult::Success);
        tracing::info!(
            username = %account.claims.username,
            authorities = account.claims.authorities.len(),
            "User logged in"
        );

        let context = SecurityContext::authenticated(Principal::new(
            account.claims.username.clone(),
            account.claims.authorities.clone(),
        ));

        Ok(LoginOutcome {
            token,
            claims: account.claims,
            context,
        })
    }

    /// Return the credential for `username`, creating it on first touch.
    ///
    /// A new credential gets a random placeholder password and the default
    /// role. An existing row (deleted or not) is returned unchanged.
    pub async fn register_or_get_default(
        &self,
        username: &str,
        display_name: Option<&str>,
    ) -> Result<Credential, AppError> {
        let user_repo = UserRepository::new(self.db.clone());

        if let Some(existing) = user_repo.find_by_username(username).await? {
            return Ok(existing);
        }

        let default_role = self.ensure_default_role().await?;

        let placeholder = PasswordHasher::generate_placeholder_password();
        let password_hash = self.password_hasher.hash_blocking(placeholder).await?;

        let mut credential =
            Credential::new(username, password_hash, BTreeSet::from([default_role.id]));
        credential.display_name = display_name.map(str::to_string);

        let (credential, created) = user_repo.insert_if_absent(credential).await?;
        if created {
            tracing::info!(
                username = %credential.username,
                role = %default_role.name,
                "Created first-touch account"
            );
        }

        Ok(credential)
    }

    async fn ensure_default_role(&self) -> Result<Role, AppError> {
        let role_repo = RoleRepository::new(self.db.clone());
        let name = &self.config.security.default_role.to_ascii_uppercase();

        if let Some(role) = role_repo.find_by_name(name).await? {
            return Ok(role);
        }

        match role_repo.insert(Role::new(name.clone(), BTreeSet::new())).await {
            Ok(role) => Ok(role),
            // Created concurrently
            Err(AppError::Conflict(_)) => role_repo
                .find_by_name(name)
                .await?
                .ok_or_else(|| AppError::Internal(format!("default role '{}' vanished", name))),
            Err(e) => Err(e),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum LoginResult {
    Success,
    UnknownUser,
    BadPassword,
    AccountStatus,
}

fn record_login(result: LoginResult) {
    let outcome = match result {
        LoginResult::Success => "success",
        LoginResult::UnknownUser => "unknown_user",
        LoginResult::BadPassword => "bad_password",
        LoginResult::AccountStatus => "account_status",
    };
    metrics::counter!("auth_login_total", "outcome" => outcome).increment(1);
}
