/// Client routes and the authentication guard
///
/// ```text
/// /                                   Home
/// /login                              Login
/// /signup                             Signup
/// /dashboard                          Dashboard       (protected)
/// /dashboard/createtask               CreateTask      (protected)
/// /dashboard/createtask?edit=<id>     EditTask(id)    (protected)
/// ```

use std::{fmt, str::FromStr};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    Login,
    Signup,
    Dashboard,
    CreateTask,
    EditTask(Uuid),
}

/// Where navigation ends up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Allow(Route),
    Redirect(Route),
}

impl Navigation {
    pub fn destination(&self) -> Route {
        match self {
            Navigation::Allow(route) | Navigation::Redirect(route) => *route,
        }
    }
}

impl Route {
    pub fn is_protected(&self) -> bool {
        matches!(
            self,
            Route::Dashboard | Route::CreateTask | Route::EditTask(_)
        )
    }

    /// Protected routes send unauthenticated users to `/login`
    pub fn guard(self, authenticated: bool) -> Navigation {
        if self.is_protected() && !authenticated {
            Navigation::Redirect(Route::Login)
        } else {
            Navigation::Allow(self)
        }
    }

    /// Target of the home page's "get started" link
    pub fn home_call_to_action(authenticated: bool) -> Route {
        if authenticated {
            Route::Dashboard
        } else {
            Route::Login
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Home => f.write_str("/"),
            Route::Login => f.write_str("/login"),
            Route::Signup => f.write_str("/signup"),
            Route::Dashboard => f.write_str("/dashboard"),
            Route::CreateTask => f.write_str("/dashboard/createtask"),
            Route::EditTask(id) => write!(f, "/dashboard/createtask?edit={}", id),
        }
    }
}

impl FromStr for Route {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (path, query) = s.split_once('?').unwrap_or((s, ""));
        let path = match path.trim_end_matches('/') {
            "" => "/",
            trimmed => trimmed,
        };

        match path {
            "/" => Ok(Route::Home),
            "/login" => Ok(Route::Login),
            "/signup" => Ok(Route::Signup),
            "/dashboard" => Ok(Route::Dashboard),
            "/dashboard/createtask" => {
                let edit = query
                    .split('&')
                    .find_map(|pair| pair.strip_prefix("edit="))
                    .filter(|id| !id.is_empty());

                match edit {
                    Some(id) => id
                        .parse()
                        .map(Route::EditTask)
                        .map_err(|_| format!("Invalid task id: {}", id)),
                    None => Ok(Route::CreateTask),
                }
            }
            other => Err(format!("Unknown route: {}", other)),
        }
    }
}
