//! Runs one embedded `PostgreSQL` lifecycle step for the registry test
//! cluster, as an unprivileged user when launched by root.
//!
//! ```text
//! pg_worker <setup|start|stop> <config-path>
//! ```
//!
//! `config-path` names a JSON [`WorkerPayload`] carrying the cluster settings
//! and the environment overrides to apply before the step runs. `PostgreSQL`
//! refuses to run as root, so the worker switches to `nobody` first.

/// Boxed error type for the main result.
type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[cfg(unix)]
mod unix {
    use super::BoxError;
    use camino::{Utf8Path, Utf8PathBuf};
    use nix::unistd::{Uid, User, initgroups, setgid, setuid};
    use pg_embedded_setup_unpriv::ambient_dir_and_path;
    use pg_embedded_setup_unpriv::worker::{PlainSecret, WorkerPayload};
    use postgresql_embedded::{PostgreSQL, Status};
    use std::env;
    use std::ffi::CString;
    use std::io::Read;
    use thiserror::Error;
    use tokio::runtime::Builder;

    const UNPRIVILEGED_USER: &str = "nobody";

    /// Failures of a worker invocation.
    #[derive(Debug, Error)]
    pub(crate) enum WorkerError {
        #[error("invalid arguments: {0}")]
        InvalidArgs(String),
        #[error("failed to read worker config: {0}")]
        ConfigRead(#[source] BoxError),
        #[error("failed to parse worker config: {0}")]
        ConfigParse(#[source] serde_json::Error),
        #[error("settings conversion failed: {0}")]
        SettingsConversion(String),
        #[error("runtime init failed: {0}")]
        RuntimeInit(#[source] std::io::Error),
        #[error("failed to drop privileges: {0}")]
        PrivilegeDrop(String),
        #[error("postgres operation failed: {0}")]
        PostgresOperation(String),
    }

    /// Lifecycle step requested on the command line.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub(crate) enum Operation {
        Setup,
        Start,
        Stop,
    }

    impl Operation {
        fn parse(raw: &str) -> Result<Self, WorkerError> {
            match raw {
                "setup" => Ok(Self::Setup),
                "start" => Ok(Self::Start),
                "stop" => Ok(Self::Stop),
                other => Err(WorkerError::InvalidArgs(format!(
                    "unknown operation '{other}'; expected setup, start, or stop"
                ))),
            }
        }
    }

    pub(crate) fn run() -> Result<(), WorkerError> {
        let args = env::args_os()
            .map(|arg| {
                arg.into_string()
                    .map(Utf8PathBuf::from)
                    .map_err(|_| WorkerError::InvalidArgs("argument is not valid UTF-8".into()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let (operation, config_path) = parse_args(args)?;
        let payload = load_payload(&config_path)?;
        drop_privileges_if_root()?;

        let settings = payload
            .settings
            .into_settings()
            .map_err(|err| WorkerError::SettingsConversion(err.to_string()))?;
        apply_environment(&payload.environment);

        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(WorkerError::RuntimeInit)?;
        let mut postgres = PostgreSQL::new(settings);
        runtime.block_on(async {
            match operation {
                Operation::Setup => {
                    postgres.setup().await.map_err(operation_error)?;
                    ensure_started(&mut postgres).await
                }
                Operation::Start => {
                    ensure_started(&mut postgres).await?;
                    // The cluster must outlive this process.
                    let _running = std::mem::ManuallyDrop::new(postgres);
                    Ok(())
                }
                Operation::Stop => postgres.stop().await.map_err(operation_error),
            }
        })
    }

    pub(crate) fn parse_args(
        args: impl IntoIterator<Item = Utf8PathBuf>,
    ) -> Result<(Operation, Utf8PathBuf), WorkerError> {
        let mut args = args.into_iter().skip(1);
        let operation = args
            .next()
            .ok_or_else(|| WorkerError::InvalidArgs("missing operation argument".into()))
            .and_then(|arg| Operation::parse(arg.as_str()))?;
        let config_path = args
            .next()
            .ok_or_else(|| WorkerError::InvalidArgs("missing config path argument".into()))?;
        if let Some(extra) = args.next() {
            return Err(WorkerError::InvalidArgs(format!(
                "unexpected extra argument: {extra}"
            )));
        }
        Ok((operation, config_path))
    }

    fn load_payload(config_path: &Utf8Path) -> Result<WorkerPayload, WorkerError> {
        let bytes = read_config(config_path).map_err(WorkerError::ConfigRead)?;
        serde_json::from_slice(&bytes).map_err(WorkerError::ConfigParse)
    }

    fn read_config(path: &Utf8Path) -> Result<Vec<u8>, BoxError> {
        let (dir, relative) = ambient_dir_and_path(path)?;
        let mut file = dir.open(relative.as_std_path())?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)?;
        Ok(bytes)
    }

    fn drop_privileges_if_root() -> Result<(), WorkerError> {
        if !Uid::effective().is_root() {
            return Ok(());
        }

        let privilege_error = |err: nix::Error| WorkerError::PrivilegeDrop(err.to_string());
        let user = User::from_name(UNPRIVILEGED_USER)
            .map_err(privilege_error)?
            .ok_or_else(|| {
                WorkerError::PrivilegeDrop(format!("user '{UNPRIVILEGED_USER}' not found"))
            })?;
        let user_name = CString::new(user.name.clone())
            .map_err(|err| WorkerError::PrivilegeDrop(err.to_string()))?;

        initgroups(&user_name, user.gid).map_err(privilege_error)?;
        setgid(user.gid).map_err(privilege_error)?;
        setuid(user.uid).map_err(privilege_error)?;

        // SAFETY: no other thread exists yet; the runtime is built afterwards.
        unsafe {
            env::set_var("HOME", &user.dir);
            env::set_var("USER", &user.name);
            env::set_var("LOGNAME", &user.name);
        }
        Ok(())
    }

    fn apply_environment(environment: &[(String, Option<PlainSecret>)]) {
        for (key, value) in environment {
            // SAFETY: no other thread exists yet; the runtime is built afterwards.
            unsafe {
                match value {
                    Some(plain) => env::set_var(key, plain.expose()),
                    None => env::remove_var(key),
                }
            }
        }
    }

    async fn ensure_started(postgres: &mut PostgreSQL) -> Result<(), WorkerError> {
        if matches!(postgres.status(), Status::Started) {
            return Ok(());
        }
        postgres.start().await.map_err(operation_error)
    }

    fn operation_error(err: postgresql_embedded::Error) -> WorkerError {
        WorkerError::PostgresOperation(err.to_string())
    }

}

#[cfg(unix)]
fn main() -> Result<(), BoxError> {
    unix::run().map_err(Into::into)
}

#[cfg(not(unix))]
fn main() -> Result<(), BoxError> {
    Err("pg_worker is not supported on non-Unix platforms".into())
}
