//! Application orchestrator.
//! Loads/merges config, initializes logging, installs the signal handler,
//! validates the site, takes the site lock, builds the mask and relocates it.

use anyhow::{Result, anyhow};
use std::sync::{Arc, Mutex};
use tracing::{debug, error, info, warn};

use pheno_offset::cli::Args;
use pheno_offset::config::CONFIG_ENV;
use pheno_offset::discover::scan_site;
use pheno_offset::fs_ops::try_acquire_site_lock;
use pheno_offset::output as out;
use pheno_offset::{
    LocalStore, Mask, PhenoOffsetError, RelocationOutcome, Relocator, ShutdownFlag, create_template_config,
    default_config_path, load_config,
};

use crate::logging::init_tracing;

/// Run the CLI application.
pub fn run(args: Args) -> Result<()> {
    // Config location queries run before logging init.
    if args.print_config {
        print_config_location();
        return Ok(());
    }
    if args.init_config {
        let path = default_config_path()?;
        create_template_config(&path)?;
        out::print_success(&format!("A template pheno_offset config was written to: {}", path.display()));
        out::print_info(&format!(
            "Edit `archive_root` and optionally `log_level`, `log_file` and `confine_to_range`. To use a different location set {CONFIG_ENV}."
        ));
        return Ok(());
    }

    let mut cfg = load_config()?;
    args.apply_overrides(&mut cfg);

    if !args.ignore_warning {
        eprintln!("{}", out::SAFETY_WARNING);
        if args.verbose > 0 {
            out::print_info(&format!("Archive path: {}", cfg.archive_root.display()));
        }
        return Ok(());
    }
    if !args.has_direction() {
        out::print_error("Choose a direction: --positive or --negative.");
        return Err(PhenoOffsetError::MissingArgument("--positive|--negative").into());
    }

    let guard_opt = init_tracing(cfg.log_level, cfg.log_file.as_deref(), args.json).map_err(|e| {
        out::print_error(&format!("Failed to initialize logging: {}", e));
        e
    })?;

    // The guard is dropped on SIGINT so buffered file logs are flushed.
    let guard_slot = Arc::new(Mutex::new(guard_opt));
    let shutdown = ShutdownFlag::new();
    {
        let guard_slot = Arc::clone(&guard_slot);
        let shutdown = shutdown.clone();
        let installed = ctrlc::set_handler(move || {
            shutdown.request();
            out::print_warn("Received interrupt; finishing the current image then stopping...");
            if let Ok(mut g) = guard_slot.lock() {
                let _ = g.take();
            }
        });
        if let Err(e) = installed {
            warn!(error = %e, "failed to install signal handler; Ctrl-C will stop abruptly");
        }
    }

    debug!("Starting pheno_offset: {:?}", args);

    let result = (|| -> Result<()> {
        let job = args.job().map_err(|e| {
            error!(code = e.code(), error = %e, "Invalid request");
            e
        })?;

        cfg.normalize();
        let site_path = cfg.validate(&job.site).map_err(|e| {
            if let Some(pe) = e.downcast_ref::<PhenoOffsetError>() {
                error!(code = pe.code(), error = %pe, "Site validation failed");
            }
            e
        })?;

        // Dry runs only read, so they skip the lock (and the lock file).
        let _lock = if cfg.dry_run {
            None
        } else {
            match try_acquire_site_lock(&site_path)? {
                Some(lock) => {
                    debug!(path = %lock.path().display(), "site locked");
                    Some(lock)
                }
                None => return Err(PhenoOffsetError::SiteLocked(site_path).into()),
            }
        };

        let shift = job.effective_shift();
        let store = LocalStore;
        let gathered = scan_site(&cfg.archive_root, &job.site, &store);

        let mut mask: Mask = gathered.mask.filter(&job.window);
        if cfg.confine_to_range {
            let confined = mask.confine(&job.window, shift);
            let dropped = mask.len() - confined.len();
            if dropped > 0 {
                info!(dropped, "images left out: corrected date leaves the selected range");
            }
            mask = confined;
        }
        info!(
            site = %job.site,
            shift = %shift,
            selected = mask.len(),
            unparsable = gathered.unparsable.len(),
            "mask built"
        );

        let collisions = mask.sorted_for_shift(shift).detect_collisions(&cfg.archive_root, shift, &store);
        if !collisions.is_empty() {
            out::print_collisions(&collisions);
        }

        let relocator = Relocator::new(
            cfg.archive_root.clone(),
            job.shift,
            cfg.relocate_options(job.negative),
            store,
        )
        .with_shutdown(shutdown.clone());
        let mut report = relocator.relocate(mask);
        report.extend(gathered.unparsable.into_iter().map(RelocationOutcome::unparsable));

        if args.report_json {
            out::print_report_json(&report)?;
        } else {
            out::print_report(&report, args.verbose > 0 || cfg.dry_run);
        }

        if report.interrupted {
            return Err(PhenoOffsetError::Interrupted.into());
        }
        if report.has_failures() {
            return Err(anyhow!("{} file(s) could not be relocated", report.tally().failed));
        }
        Ok(())
    })();

    // Ensure logs are flushed before exit
    if let Ok(mut g) = guard_slot.lock() {
        let _ = g.take();
    }

    result
}

fn print_config_location() {
    if let Ok(cfg_env) = std::env::var(CONFIG_ENV) {
        out::print_info(&format!("Using {CONFIG_ENV} (explicit):\n  {}\n", cfg_env));
        out::print_info(&format!("To override, unset {CONFIG_ENV} or set it to another file."));
        return;
    }
    match default_config_path() {
        Ok(p) => {
            out::print_info(&format!("Default pheno_offset config path:\n  {}\n", p.display()));
            if p.exists() {
                out::print_info("A config file already exists at that location.");
            } else {
                out::print_info("No config file exists there yet. Run with --init-config to create a template.");
            }
        }
        Err(e) => {
            out::print_error(&format!("Could not determine a default config path: {e}"));
        }
    }
}
