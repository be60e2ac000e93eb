// zabbixbackup/src/backup/dump_params.rs

/// Maximum number of table names folded into one pg_dump pattern.
pub const DEFAULT_BATCH_SIZE: usize = 4;

/// Builds pg_dump filter arguments: one `--exclude-table-data` per batch of
/// `nodata` tables followed by one `--exclude-table` per batch of `ignore`
/// tables, each value being an alternation pattern `(a|b|c|d)`.
pub fn build_dump_params(nodata: &[String], ignore: &[String], batch_size: usize) -> Vec<String> {
    let batch_size = batch_size.max(1);
    let mut params = Vec::new();

    for batch in nodata.chunks(batch_size) {
        params.push("--exclude-table-data".to_string());
        params.push(alternation(batch));
    }

    for batch in ignore.chunks(batch_size) {
        params.push("--exclude-table".to_string());
        params.push(alternation(batch));
    }

    params
}

fn alternation(names: &[String]) -> String {
    format!("({})", names.join("|"))
}
