//! # Rc-File
//!
//! The rc-file is the script the launched shell sources. It is a temporary
//! file holding the bytes of each activated profile, one after another. The
//! returned [`TempPath`] removes the file when dropped, so whoever owns it
//! decides how long the file lives.

use crate::{
    constants::RCFILE_PREFIX,
    core::commons::wrap_value,
    logging::LogContext,
    models::ProfileEnv,
    system::environ::Environ,
};
use std::{
    collections::HashSet,
    fs::File,
    io::{self, BufRead, BufReader, Seek, SeekFrom, Write},
    path::Path,
};
use tempfile::TempPath;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RcWriteError {
    #[error("Could not create the rc-file: {0}")]
    Create(#[source] io::Error),
    #[error("Could not write profile '{profile}' to the rc-file: {source}")]
    Write {
        profile: String,
        #[source]
        source: io::Error,
    },
    #[error("Could not finalize the rc-file: {0}")]
    Finalize(#[source] io::Error),
}

/// A written rc-file and the profiles it contains, in order.
#[derive(Debug)]
pub struct RcFile {
    /// The file on disk; removed when dropped.
    pub path: TempPath,
    /// Profiles written, in order.
    pub profiles: Vec<String>,
}

/// Writes the selected profiles into a new temporary rc-file.
///
/// Each profile starts where the previous one ended. Repeated names are
/// written once, and names without an entry in `env` are skipped.
pub fn write_rcfile(
    env: &ProfileEnv,
    selection: &[String],
    log: &LogContext,
) -> Result<RcFile, RcWriteError> {
    let mut file = tempfile::Builder::new()
        .prefix(RCFILE_PREFIX)
        .tempfile()
        .map_err(RcWriteError::Create)?;

    let mut seen = HashSet::new();
    let mut profiles = Vec::new();
    let mut offset: u64 = 0;

    for name in selection {
        if !seen.insert(name.as_str()) {
            continue;
        }
        let Some(bytes) = env.get(name) else {
            continue;
        };

        file.seek(SeekFrom::Start(offset))
            .and_then(|_| file.write_all(bytes))
            .map_err(|e| RcWriteError::Write {
                profile: name.clone(),
                source: e,
            })?;

        log.with_field("profile", name)
            .with_field("size", format!("{}B", bytes.len()))
            .with_field("offset", offset)
            .with_field("path", file.path().display())
            .info("activated profile");

        offset += bytes.len() as u64;
        profiles.push(name.clone());
    }

    file.flush().map_err(RcWriteError::Finalize)?;

    Ok(RcFile {
        path: file.into_temp_path(),
        profiles,
    })
}

/// Copies the rc-file at `path` to `out` as a standalone script.
///
/// The script starts with a shebang naming `shell`, followed by an `export`
/// line per variable of `exports` (when given), followed by the rc-file
/// body. Lines in the body that repeat the shebang are left out.
pub fn copy_rcfile(
    out: &mut impl Write,
    path: &Path,
    shell: &str,
    exports: Option<&Environ>,
) -> io::Result<()> {
    let reader = BufReader::new(File::open(path)?);

    let bang = format!("#!{}", shell);
    writeln!(out, "{}", bang)?;

    if let Some(environ) = exports {
        for (key, value) in environ.iter() {
            writeln!(
                out,
                "export {}={}",
                key.to_string_lossy(),
                wrap_value(&value.to_string_lossy())
            )?;
        }
    }

    for line in reader.split(b'\n') {
        let mut line = line?;
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        if String::from_utf8_lossy(&line).trim() == bang {
            continue;
        }
        out.write_all(&line)?;
        out.write_all(b"\n")?;
    }

    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn profile_env(entries: &[(&str, &str)]) -> ProfileEnv {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.as_bytes().to_vec()))
            .collect()
    }

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_profiles_written_consecutively_once() {
        let env = profile_env(&[("auto", "A=1\n"), ("p1", "P1=1\n"), ("p2", "P2=1\n")]);
        let rc = write_rcfile(
            &env,
            &names(&["auto", "p1", "p1", "p2", "p1"]),
            &LogContext::null(),
        )
        .unwrap();

        assert_eq!(fs::read_to_string(&rc.path).unwrap(), "A=1\nP1=1\nP2=1\n");
        assert_eq!(rc.profiles, names(&["auto", "p1", "p2"]));
    }

    #[test]
    fn test_unknown_and_empty_profiles() {
        let env = profile_env(&[("auto", ""), ("p", "P=1\n")]);
        let rc = write_rcfile(&env, &names(&["auto", "ghost", "p"]), &LogContext::null()).unwrap();

        assert_eq!(fs::read_to_string(&rc.path).unwrap(), "P=1\n");
        assert_eq!(rc.profiles, names(&["auto", "p"]));
    }

    #[test]
    fn test_rcfile_removed_on_drop() {
        let env = profile_env(&[("auto", "A=1\n")]);
        let rc = write_rcfile(&env, &names(&["auto"]), &LogContext::null()).unwrap();
        let path = rc.path.to_path_buf();
        assert!(path.exists());
        assert!(path.file_name().unwrap().to_string_lossy().starts_with("goshrc-"));

        drop(rc);
        assert!(!path.exists());
    }

    #[test]
    fn test_copy_with_exports_and_shebang_filter() {
        let env = profile_env(&[("auto", "#!/bin/bash\nX=1\n  #!/bin/bash  \necho \"hi\"")]);
        let rc = write_rcfile(&env, &names(&["auto"]), &LogContext::null()).unwrap();
        let exports: Environ = [("HOME", "/home/me"), ("Q", "say \"x\"")].into_iter().collect();

        let mut out = Vec::new();
        copy_rcfile(&mut out, &rc.path, "/bin/bash", Some(&exports)).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "#!/bin/bash\n\
             export HOME=\"/home/me\"\n\
             export Q=\"say \\\"x\\\"\"\n\
             X=1\n\
             echo \"hi\"\n"
        );
    }

    #[test]
    fn test_copy_without_exports() {
        let env = profile_env(&[("auto", "X=1\r\nY=2\n")]);
        let rc = write_rcfile(&env, &names(&["auto"]), &LogContext::null()).unwrap();

        let mut out = Vec::new();
        copy_rcfile(&mut out, &rc.path, "/bin/zsh", None).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "#!/bin/zsh\nX=1\nY=2\n");
    }
}
