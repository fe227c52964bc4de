use crate::http::Method;

/// The handler a request is dispatched to, borrowing any path parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route<'a> {
    Root,
    Echo(&'a str),
    UserAgent,
    ReadFile(&'a str),
    WriteFile(&'a str),
    NotFound,
}

/// Handler kinds a route entry can point at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Root,
    Echo,
    UserAgent,
    ReadFile,
    WriteFile,
}

/// How a route entry compares against the request path
#[derive(Debug, Clone, Copy)]
enum Pattern {
    Exact(&'static str),
    /// Matches any path starting with the prefix; the rest is the parameter
    Prefix(&'static str),
}

/// A route entry in the router
#[derive(Debug, Clone)]
struct RouteEntry {
    /// `None` answers to any method
    method: Option<Method>,
    pattern: Pattern,
    target: Target,
}

/// Maps (method, path) to a route.
///
/// Entries are checked in registration order and the first match wins.
/// Paths are compared verbatim: no normalization, no percent-decoding.
#[derive(Debug, Clone)]
pub struct Router {
    routes: Vec<RouteEntry>,
}

impl Router {
    /// Create the router with the server's fixed route table
    pub fn new() -> Self {
        let mut router = Self { routes: Vec::new() };
        router
            .add(None, Pattern::Exact("/"), Target::Root)
            .add(None, Pattern::Prefix("/echo/"), Target::Echo)
            .add(None, Pattern::Exact("/user-agent"), Target::UserAgent)
            .add(Some(Method::Get), Pattern::Prefix("/files/"), Target::ReadFile)
            .add(Some(Method::Post), Pattern::Prefix("/files/"), Target::WriteFile);
        router
    }

    fn add(&mut self, method: Option<Method>, pattern: Pattern, target: Target) -> &mut Self {
        self.routes.push(RouteEntry {
            method,
            pattern,
            target,
        });
        self
    }

    /// Select the route for a request
    pub fn resolve<'a>(&self, method: &Method, path: &'a str) -> Route<'a> {
        for entry in &self.routes {
            if entry.method.as_ref().is_some_and(|m| m != method) {
                continue;
            }

            let param = match entry.pattern {
                Pattern::Exact(exact) if path == exact => "",
                Pattern::Prefix(prefix) => match path.strip_prefix(prefix) {
                    Some(rest) => rest,
                    None => continue,
                },
                _ => continue,
            };

            return match entry.target {
                Target::Root => Route::Root,
                Target::Echo => Route::Echo(param),
                Target::UserAgent => Route::UserAgent,
                Target::ReadFile => Route::ReadFile(param),
                Target::WriteFile => Route::WriteFile(param),
            };
        }

        Route::NotFound
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}
