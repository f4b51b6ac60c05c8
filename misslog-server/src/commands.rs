use misslog_core::Configuration;
use misslog_core::sanitize::SettingsForm;
use misslog_core::settings::validate_date_format;
use misslog_observability::Placeholder;
use misslog_observability::template::unknown_tokens;
use misslog_store::SettingsStore;
use std::io::Write;
use tracing::{info, warn};

/// List the template variables with their descriptions.
pub fn print_vars(out: &mut impl Write) -> std::io::Result<()> {
    writeln!(out, "Available template variables:")?;
    for p in Placeholder::all() {
        writeln!(out, "  {:<12} {}", p.token(), p.description())?;
    }
    writeln!(out)?;
    writeln!(out, "An empty template writes the built-in error-log layout.")?;
    Ok(())
}

/// Print the current settings as YAML.
pub fn show_config(store: &dyn SettingsStore, out: &mut impl Write) -> anyhow::Result<()> {
    let config = store.load()?;
    write!(out, "{}", serde_yaml::to_string(&config)?)?;
    Ok(())
}

/// Sanitize a submission, merge it over the stored settings and save.
pub fn set_config(
    store: &dyn SettingsStore,
    form: SettingsForm,
    out: &mut impl Write,
) -> anyhow::Result<Configuration> {
    if form.is_empty() {
        anyhow::bail!("nothing to set: pass at least one of --enabled, --file-path, --template, --date-format");
    }

    let current = store.load()?;
    let next = form.apply(&current);

    for token in unknown_tokens(&next.template) {
        warn!(token, "Template uses an unknown variable, it will be written as-is");
    }
    if let Err(e) = validate_date_format(&next.date_format) {
        warn!(error = %e, "The default date format will be used instead");
    }
    if next.enabled && next.file_path.is_empty() {
        warn!("Logging is enabled but no file path is set");
    }

    store.save(&next)?;
    info!(key = store.key(), "Settings saved");

    write!(out, "{}", serde_yaml::to_string(&next)?)?;
    Ok(next)
}
