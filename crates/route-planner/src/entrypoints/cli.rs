use clap::Parser;

/// Program name placed in front of arguments rebuilt from a URL
const PROGRAM: &str = "route-planner";

/// Parses from the command line arguments on native and from GET parameters on web.
pub fn parse_args<T: Parser>() -> Result<T, clap::Error> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        T::try_parse()
    }
    #[cfg(target_arch = "wasm32")]
    {
        let href = web_sys::window()
            .and_then(|w| w.location().href().ok())
            .unwrap_or_default();
        T::try_parse_from(args_from_url(&href))
    }
}

/// Turn `cli`-prefixed query parameters into command line arguments
///
/// `?cliorigin=Paris&cliignore-persisted` becomes
/// `route-planner --origin Paris --ignore-persisted`. Values are percent-decoded;
/// other parameters are left alone.
pub fn args_from_url(href: &str) -> Vec<String> {
    let mut args = vec![PROGRAM.to_string()];
    let Ok(url) = reqwest::Url::parse(href) else {
        return args;
    };

    for (key, value) in url.query_pairs() {
        let Some(flag) = key.strip_prefix("cli") else {
            continue;
        };
        if !flag.is_empty() {
            args.push(format!("--{flag}"));
        }
        if !value.is_empty() {
            args.push(value.into_owned());
        }
    }
    args
}
