//! Registration, login and identity scenarios

use async_trait::async_trait;

use crate::api::types::{AuthResponse, Credentials, LoginResponse, User};
use crate::api::{expect_status, ApiClient, CallResult, Role};
use crate::common::{Failure, UserFixture};
use crate::testing::context::{EntityKey, SessionContext};
use crate::testing::scenario::{Scenario, ScenarioOutput};

/// Register one account per configured role
pub struct Registration {
    users: Vec<UserFixture>,
}

impl Registration {
    pub fn new(users: Vec<UserFixture>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl Scenario for Registration {
    fn title(&self) -> String {
        "User Registration".to_string()
    }

    async fn run(&self, client: &ApiClient, context: SessionContext) -> ScenarioOutput {
        let mut out = ScenarioOutput::new(context);

        for user in &self.users {
            let role = user.role;
            let name = format!("Register {}", role);
            let result = client
                .post("auth/register", &user.registration(), None)
                .await;

            match registered(result) {
                Ok(auth) => {
                    out.update(|ctx| {
                        ctx.with_token(role, auth.token.clone())
                            .with_record(EntityKey::User(role), &auth.user)
                    });
                    out.pass(name, format!("Successfully registered {} user", role));
                }
                Err(failure) => out.failure(name, &failure),
            }
        }

        out
    }
}

/// Log in with the same credentials, replacing the registration tokens
pub struct Login {
    users: Vec<UserFixture>,
}

impl Login {
    pub fn new(users: Vec<UserFixture>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl Scenario for Login {
    fn title(&self) -> String {
        "User Login".to_string()
    }

    async fn run(&self, client: &ApiClient, context: SessionContext) -> ScenarioOutput {
        let mut out = ScenarioOutput::new(context);

        for user in &self.users {
            let role = user.role;
            let name = format!("Login {}", role);
            let credentials = Credentials {
                email: user.email.clone(),
                password: user.password.clone(),
            };
            let result = client.post("auth/login", &credentials, None).await;

            match logged_in(result) {
                Ok(login) => {
                    out.update(|ctx| ctx.with_token(role, login.token));
                    out.pass(name, format!("Successfully logged in {} user", role));
                }
                Err(failure) => out.failure(name, &failure),
            }
        }

        out
    }
}

/// `auth/me` for every held token; the declared role must match
pub struct Identity;

#[async_trait]
impl Scenario for Identity {
    fn title(&self) -> String {
        "Auth Me Endpoint".to_string()
    }

    async fn run(&self, client: &ApiClient, context: SessionContext) -> ScenarioOutput {
        let mut out = ScenarioOutput::new(context);

        let tokens: Vec<(Role, String)> = out
            .context
            .tokens()
            .map(|(role, token)| (role, token.to_string()))
            .collect();
        if tokens.is_empty() {
            out.failure("Auth me", &Failure::missing("Bearer token"));
            return out;
        }

        for (role, token) in tokens {
            let name = format!("Auth me {}", role);
            let result = client.get("auth/me", Some(&token)).await;

            match identify(result, role) {
                Ok(_) => out.pass(name, format!("Successfully retrieved {} user data", role)),
                Err(failure) => out.failure(name, &failure),
            }
        }

        out
    }
}

fn registered(result: CallResult) -> Result<AuthResponse, Failure> {
    let response = expect_status(result, 200)?;
    let auth: AuthResponse = response.decode("Registration response missing token or user data")?;
    if auth.token.is_empty() {
        return Err(Failure::malformed(
            "Registration response carried an empty token",
            &response.body,
        ));
    }
    Ok(auth)
}

fn logged_in(result: CallResult) -> Result<LoginResponse, Failure> {
    let response = expect_status(result, 200)?;
    let login: LoginResponse = response.decode("Login response missing token")?;
    if login.token.is_empty() {
        return Err(Failure::malformed(
            "Login response carried an empty token",
            &response.body,
        ));
    }
    Ok(login)
}

/// The account behind a token, which must declare the token's role
fn identify(result: CallResult, role: Role) -> Result<User, Failure> {
    let response = expect_status(result, 200)?;
    let user: User = response.decode("User data missing required fields")?;
    if !role.accepts(&user.role) {
        return Err(Failure::malformed(
            format!("Declared role '{}' does not match the {} token", user.role, role),
            &response.body,
        ));
    }
    Ok(user)
}
