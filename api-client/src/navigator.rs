//! Navigation primitive consumed by the decoder and the cart controller.

use std::fmt;
use std::sync::Arc;

/// Destinations the client layer can send the user to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// Login entry point; target of every HTTP 401.
    Login,
    /// Order page; target of a successful checkout handoff.
    Order,
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Login => "login",
            Self::Order => "order",
        };
        f.write_str(name)
    }
}

/// Performs a navigation side effect.
///
/// Implementations must not block; they are called from async code right
/// after a response has been classified.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

impl<N: Navigator + ?Sized> Navigator for Arc<N> {
    fn navigate(&self, route: Route) {
        (**self).navigate(route);
    }
}

/// Route → path table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePaths {
    pub login: String,
    pub order: String,
}

impl Default for RoutePaths {
    fn default() -> Self {
        Self {
            login: "/login".to_string(),
            order: "/order".to_string(),
        }
    }
}

impl RoutePaths {
    pub fn path(&self, route: Route) -> &str {
        match route {
            Route::Login => &self.login,
            Route::Order => &self.order,
        }
    }
}
