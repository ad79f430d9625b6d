//! Template source acquisition.
//! Resolves a template argument (local path, git repository URL or
//! abbreviation) into a local directory, cloning and caching repositories
//! with checkout-by-reference and a stale-cache removal protocol.

use crate::config::UserConfig;
use crate::error::{Error, Result};
use crate::prompt::Prompter;
use indexmap::IndexMap;
use log::debug;
use std::path::{Path, PathBuf};
use url::Url;

/// Represents the source location of a template.
#[derive(Debug)]
pub enum TemplateSource {
    /// Local filesystem template path
    FileSystem(PathBuf),
    /// Git repository URL (HTTPS or SSH)
    Git(String),
    /// Mercurial repository URL
    Mercurial(String),
    /// Archive file path or URL
    Archive(String),
}

impl std::fmt::Display for TemplateSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TemplateSource::FileSystem(path) => {
                write!(f, "local path: '{}'", path.display())
            }
            TemplateSource::Git(repo) => write!(f, "git repository: '{}'", repo),
            TemplateSource::Mercurial(repo) => write!(f, "hg repository: '{}'", repo),
            TemplateSource::Archive(archive) => write!(f, "archive: '{}'", archive),
        }
    }
}

impl TemplateSource {
    /// Classifies a template argument.
    ///
    /// `git+`/`hg+` prefixes force the repository type; otherwise URL forms
    /// and the `git@`/`.git` conventions mean git, `.zip` means an archive,
    /// and anything else is a filesystem path.
    pub fn from_string(s: &str) -> Self {
        if let Some(rest) = s.strip_prefix("git+") {
            return Self::Git(rest.to_string());
        }
        if let Some(rest) = s.strip_prefix("hg+") {
            return Self::Mercurial(rest.to_string());
        }
        if s.ends_with(".zip") {
            return Self::Archive(s.to_string());
        }
        if s.starts_with("git@") {
            return Self::Git(s.to_string());
        }
        if let Ok(url) = Url::parse(s) {
            if matches!(url.scheme(), "https" | "http" | "git" | "ssh") {
                return Self::Git(s.to_string());
            }
        }
        if s.ends_with(".git") {
            return Self::Git(s.to_string());
        }
        Self::FileSystem(PathBuf::from(s))
    }
}

/// Expands a template abbreviation.
///
/// A full match replaces the whole argument; a `prefix:rest` form
/// substitutes `rest` into the abbreviation's `{0}` placeholder. Anything
/// else passes through unchanged.
pub fn expand_abbreviations(template: &str, abbreviations: &IndexMap<String, String>) -> String {
    if let Some(expansion) = abbreviations.get(template) {
        return expansion.clone();
    }
    if let Some((prefix, rest)) = template.split_once(':') {
        if let Some(expansion) = abbreviations.get(prefix) {
            return expansion.replace("{0}", rest);
        }
    }
    template.to_string()
}

fn checkout_reference(
    repo: &git2::Repository,
    reference: &str,
) -> std::result::Result<(), git2::Error> {
    let (object, resolved) = repo.revparse_ext(reference)?;
    repo.checkout_tree(&object, None)?;
    match resolved {
        Some(gref) => repo.set_head(gref.name().unwrap_or_default()),
        None => repo.set_head_detached(object.id()),
    }
}

/// Clones a repository into the clone cache and returns its directory.
///
/// An existing clone of the same repository is deleted without prompting
/// under `no_input` (forced refresh); otherwise the user chooses between
/// deleting and re-using it.
pub fn clone(
    repo_url: &str,
    checkout: Option<&str>,
    clone_to_dir: &Path,
    no_input: bool,
    prompter: &dyn Prompter,
) -> Result<PathBuf> {
    std::fs::create_dir_all(clone_to_dir)?;

    let repo_name = repo_url
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or("template")
        .trim_end_matches(".git");
    let repo_dir = clone_to_dir.join(repo_name);

    if repo_dir.exists() {
        let delete = no_input
            || prompter.read_yes_no(
                &format!(
                    "You've downloaded {} before. Is it okay to delete and re-download it?",
                    repo_dir.display()
                ),
                true,
            )?;
        if delete {
            debug!("Removing cached clone {}", repo_dir.display());
            std::fs::remove_dir_all(&repo_dir)?;
        } else {
            debug!("Re-using cached clone {}", repo_dir.display());
            return Ok(repo_dir);
        }
    }

    debug!("Cloning '{}' to {}", repo_url, repo_dir.display());

    // Set up authentication callbacks
    let mut callbacks = git2::RemoteCallbacks::new();
    callbacks.credentials(|_url, username_from_url, _allowed_types| {
        let ssh_key = dirs::home_dir()
            .unwrap_or_default()
            .join(".ssh")
            .join("id_rsa");
        git2::Cred::ssh_key(username_from_url.unwrap_or("git"), None, &ssh_key, None)
    });

    let mut fetch_opts = git2::FetchOptions::new();
    fetch_opts.remote_callbacks(callbacks);

    let mut builder = git2::build::RepoBuilder::new();
    builder.fetch_options(fetch_opts);

    let repo = builder.clone(repo_url, &repo_dir).map_err(|e| match e.code() {
        git2::ErrorCode::NotFound | git2::ErrorCode::Auth => Error::RepositoryNotFoundError {
            template: repo_url.to_string(),
        },
        _ => Error::RepositoryCloneFailedError {
            template: repo_url.to_string(),
            message: e.message().to_string(),
        },
    })?;

    if let Some(reference) = checkout {
        checkout_reference(&repo, reference).map_err(|e| Error::RepositoryCloneFailedError {
            template: repo_url.to_string(),
            message: format!("failed to check out '{}': {}", reference, e.message()),
        })?;
    }

    Ok(repo_dir)
}

/// Resolves a template argument to a local repository directory.
///
/// Expands abbreviations, acquires the source and applies the optional
/// sub-directory for repositories holding multiple templates.
pub fn determine_repo_dir(
    template: &str,
    user_config: &UserConfig,
    checkout: Option<&str>,
    no_input: bool,
    directory: Option<&str>,
    prompter: &dyn Prompter,
) -> Result<PathBuf> {
    let expanded = expand_abbreviations(template, &user_config.abbreviations);
    let source = TemplateSource::from_string(&expanded);
    println!("Using template from the {}", source);

    let repo_dir = match source {
        TemplateSource::Git(url) => clone(
            &url,
            checkout,
            &user_config.cookiecutters_dir,
            no_input,
            prompter,
        )?,
        TemplateSource::Mercurial(_) => {
            return Err(Error::VcsNotInstalledError {
                vcs: "hg".to_string(),
            })
        }
        TemplateSource::Archive(archive) => {
            // TODO: zip archive sources (extraction, password protocol)
            return Err(Error::InvalidArchiveError {
                archive,
                message: "archive template sources are not supported".to_string(),
            });
        }
        TemplateSource::FileSystem(path) => path,
    };

    let repo_dir = match directory {
        Some(sub) => repo_dir.join(sub),
        None => repo_dir,
    };

    if !repo_dir.is_dir() {
        return Err(Error::RepositoryNotFoundError {
            template: template.to_string(),
        });
    }
    Ok(repo_dir)
}
