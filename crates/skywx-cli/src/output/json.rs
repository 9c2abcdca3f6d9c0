use serde_json::json;
use skywx_core::error::SkywxError;
use skywx_core::model::StructuredReport;

pub fn print<T: serde::Serialize + ?Sized>(value: &T) -> Result<(), SkywxError> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}

/// One entry per input: the report, or the error that stopped it.
pub fn print_batch(results: &[Result<StructuredReport, SkywxError>]) -> Result<(), SkywxError> {
    let entries: Vec<serde_json::Value> = results
        .iter()
        .map(|result| match result {
            Ok(report) => serde_json::to_value(report),
            Err(e) => Ok(json!({ "error": e.to_string() })),
        })
        .collect::<Result<_, _>>()?;
    print(&entries)
}
