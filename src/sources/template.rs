//! Template sources (`template` schema).
use anyhow::{Context as _, Result};
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Write as _};

use super::error::SourceError;
use super::helpers::fs::ensure_parent_dir;
use super::local_file::place;
use super::{ContentSource, Context, Materialized, Schema, Source};
use crate::template::Expander;

/// Suffix every template file name must carry.
pub const TEMPLATE_SUFFIX: &str = ".template";

/// A template from `<main>/<app>/files/` expanded into the work tree.
///
/// The output is named after the input with [`TEMPLATE_SUFFIX`] removed.
/// Directives are answered by the sources declared before this one in the
/// same manifest, plus this one itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateSource {
    #[serde(skip)]
    app: String,
    file: String,
    target_subdir: Option<String>,
    #[serde(skip)]
    visible: usize,
}

impl TemplateSource {
    /// Build a template source.
    ///
    /// `visible` is how many sources of the owning manifest, counted from
    /// the first, this template may consult; for the source at index `i`
    /// that is `i + 1`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::InvalidTemplateName`] if `file` does not end
    /// with [`TEMPLATE_SUFFIX`].
    pub fn new(
        app: &str,
        file: &str,
        target_subdir: Option<&str>,
        visible: usize,
    ) -> Result<Self, SourceError> {
        if !file.ends_with(TEMPLATE_SUFFIX) {
            return Err(SourceError::InvalidTemplateName {
                file: file.to_string(),
            });
        }
        Ok(Self {
            app: app.to_string(),
            file: file.to_string(),
            target_subdir: target_subdir.map(String::from),
            visible,
        })
    }

    /// Template file relative to the app's file store.
    #[must_use]
    pub fn file(&self) -> &str {
        &self.file
    }

    /// Output file name: the template name without its suffix.
    #[must_use]
    pub fn output_name(&self) -> &str {
        self.file
            .strip_suffix(TEMPLATE_SUFFIX)
            .unwrap_or(&self.file)
    }

    /// The prefix of `siblings` this template may consult.
    #[must_use]
    pub fn visible_siblings<'s>(&self, siblings: &'s [Source]) -> &'s [Source] {
        siblings.get(..self.visible).unwrap_or(siblings)
    }
}

impl ContentSource for TemplateSource {
    fn schema(&self) -> Schema {
        Schema::Template
    }

    fn description(&self) -> String {
        let out = self.target_subdir.as_deref().map_or_else(
            || self.output_name().to_string(),
            |sub| format!("{sub}/{}", self.output_name()),
        );
        format!("{} -> {out}", self.file)
    }

    fn materialize(&self, ctx: &Context<'_>, siblings: &[Source]) -> Result<Materialized> {
        let input_path = ctx.files_dir(&self.app).join(&self.file);
        let input = match File::open(&input_path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(SourceError::MissingInput { path: input_path }.into());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("opening {}", input_path.display()));
            }
        };

        let dest = place(ctx.work_dir, self.target_subdir.as_deref(), self.output_name());
        ensure_parent_dir(&dest)?;
        let output =
            File::create(&dest).with_context(|| format!("creating {}", dest.display()))?;
        let mut writer = BufWriter::new(output);

        let expander = Expander::new(ctx.work_dir, self.visible_siblings(siblings), ctx.log);
        expander
            .expand(BufReader::new(input), &mut writer)
            .with_context(|| format!("expanding {}", input_path.display()))?;
        writer
            .flush()
            .with_context(|| format!("writing {}", dest.display()))?;

        ctx.log.debug(&format!(
            "expanded {} into {}",
            input_path.display(),
            dest.display()
        ));
        Ok(Materialized::Applied)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::sources::RemoteRepoSource;
    use crate::sources::test_helpers::Fixture;

    #[test]
    fn name_without_suffix_is_rejected() {
        let err = TemplateSource::new("zsh", "notes.txt", None, 1).unwrap_err();
        assert!(matches!(err, SourceError::InvalidTemplateName { .. }));
    }

    #[test]
    fn suffix_must_be_at_the_end() {
        assert!(TemplateSource::new("zsh", "a.template.bak", None, 1).is_err());
        assert!(TemplateSource::new("zsh", "a.bak.template", None, 1).is_ok());
    }

    #[test]
    fn output_name_strips_suffix() {
        let s = TemplateSource::new("zsh", "conf/zshrc.template", None, 1).unwrap();
        assert_eq!(s.output_name(), "conf/zshrc");
    }

    #[test]
    fn sees_only_earlier_sources_and_itself() {
        let siblings: Vec<Source> = vec![
            RemoteRepoSource::new("a/one", "one", None).into(),
            TemplateSource::new("x", "t.template", None, 2).unwrap().into(),
            RemoteRepoSource::new("a/two", "two", None).into(),
        ];
        let Source::Template(t) = &siblings[1] else {
            unreachable!()
        };
        let visible = t.visible_siblings(&siblings);
        assert_eq!(visible.len(), 2);
        assert_eq!(visible, &siblings[..2]);
    }

    #[test]
    fn expands_against_extracted_repo() {
        let fx = Fixture::new(vec![]);
        fx.work_file("plugins/a.sh", "");
        fx.work_file("plugins/b.sh", "");
        fx.store_file(
            "zsh",
            "zshrc.template",
            "export X=1\n$template(source ~/${github_file:*.sh})\n",
        );
        let siblings: Vec<Source> = vec![
            RemoteRepoSource::new("alice/dots", "plugins", None).into(),
            TemplateSource::new("zsh", "zshrc.template", Some(".config"), 2)
                .unwrap()
                .into(),
        ];

        siblings[1].materialize(&fx.ctx(), &siblings).unwrap();

        let out = std::fs::read_to_string(fx.work_dir.join(".config/zshrc")).unwrap();
        insta::assert_snapshot!(out, @r"
        export X=1
        source ~/plugins/a.sh
        source ~/plugins/b.sh
        ");
    }

    #[test]
    fn later_sources_are_not_consulted() {
        let fx = Fixture::new(vec![]);
        fx.work_file("late/a.sh", "");
        fx.store_file("zsh", "rc.template", "$template(${github_file:*.sh})\n");
        let siblings: Vec<Source> = vec![
            TemplateSource::new("zsh", "rc.template", None, 1).unwrap().into(),
            RemoteRepoSource::new("alice/late", "late", None).into(),
        ];

        siblings[0].materialize(&fx.ctx(), &siblings).unwrap();

        assert_eq!(std::fs::read_to_string(fx.work_dir.join("rc")).unwrap(), "");
    }

    #[test]
    fn overwrites_existing_output() {
        let fx = Fixture::new(vec![]);
        fx.work_file("rc", "stale");
        fx.store_file("zsh", "rc.template", "fresh\n");
        let s = TemplateSource::new("zsh", "rc.template", None, 1).unwrap();

        s.materialize(&fx.ctx(), &[]).unwrap();

        assert_eq!(std::fs::read_to_string(fx.work_dir.join("rc")).unwrap(), "fresh\n");
    }

    #[test]
    fn missing_template_is_an_error() {
        let fx = Fixture::new(vec![]);
        let s = TemplateSource::new("zsh", "rc.template", None, 1).unwrap();
        let err = s.materialize(&fx.ctx(), &[]).unwrap_err();
        assert!(err.to_string().contains("source file not found"));
    }
}
