//! Purpose: Hold top-level CLI command dispatch for `stocklet`.
//! Exports: `dispatch_command`.
//! Role: Keep `main.rs` focused on parse/bootstrap and delegate command execution.
//! Invariants: Command behavior, output envelopes, and exit code semantics stay unchanged.
//! Invariants: Helpers in `main.rs` remain the source of command business logic.

use super::*;

pub(super) fn dispatch_command(
    command: Command,
    catalog_dir: PathBuf,
    color_mode: ColorMode,
) -> Result<RunOutcome, Error> {
    match command {
        Command::Completion { shell } => {
            let mut cmd = Cli::command();
            clap_complete::aot::generate(shell, &mut cmd, "stocklet", &mut io::stdout());
            Ok(RunOutcome::ok())
        }
        Command::Version => {
            emit_version_output(color_mode);
            Ok(RunOutcome::ok())
        }
        Command::Extract { text, file } => {
            let raw = resolve_extract_input(text, file)?;
            match extract(Some(raw.as_str())) {
                Some(value) => {
                    emit_json(value, color_mode);
                    Ok(RunOutcome::ok())
                }
                None => Err(Error::new(ErrorKind::Corrupt)
                    .with_message("no json value could be extracted from the input")
                    .with_hint(
                        "Pass a json value, optionally wrapped in a ```json or ```javascript fence.",
                    )),
            }
        }
        Command::Add {
            name,
            from_model,
            url,
        } => {
            let name = match (name, from_model) {
                (Some(name), None) => name,
                (None, Some(text)) => {
                    let text = if text == "-" { read_input("-")? } else { text };
                    name_from_model_output(&text, color_mode)?
                }
                (None, None) => {
                    return Err(Error::new(ErrorKind::Usage)
                        .with_message("add requires a product name or --from-model")
                        .with_hint(
                            "Use `stocklet add <name>` or `stocklet add --from-model <text>`.",
                        ));
                }
                (Some(_), Some(_)) => {
                    return Err(Error::new(ErrorKind::Usage)
                        .with_message("NAME cannot be combined with --from-model"));
                }
            };
            if let Some(base_url) = url {
                let client = RemoteCatalog::new(base_url)?;
                let body = client.create_product(&name)?;
                emit_json(
                    json!({
                        "id": body.id,
                        "name": body.name,
                        "status": body.status,
                    }),
                    color_mode,
                );
            } else {
                let catalog = Catalog::open(&catalog_dir)?;
                let product = catalog.create_product(&name)?;
                emit_json(
                    json!({
                        "id": product.id,
                        "name": product.name,
                        "status": product.status,
                    }),
                    color_mode,
                );
            }
            Ok(RunOutcome::ok())
        }
        Command::List { json } => {
            let catalog = Catalog::open(&catalog_dir)?;
            let products = catalog.list_products()?;
            if json {
                let values = products.iter().map(product_json).collect::<Vec<_>>();
                emit_json(json!({ "products": values }), color_mode);
            } else {
                emit_products_table(&products);
            }
            Ok(RunOutcome::ok())
        }
        Command::Serve { run } => {
            let config = serve_config_from_run_args(run, &catalog_dir)?;
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .map_err(|err| {
                    Error::new(ErrorKind::Internal)
                        .with_message("failed to start runtime")
                        .with_source(err)
                })?;
            runtime.block_on(serve::serve(config))?;
            Ok(RunOutcome::ok())
        }
    }
}
