use std::path::PathBuf;

use super::{
    ColumnMap, ColumnRef, DateStrategy, DedupKey, MergeConfig, PipelineConfig, SourceFormat,
    SourceSchema, Terminal,
};

impl PipelineConfig {
    /// The archive batch this tool was written for: four raw exports plus a
    /// pre-built 2001-2017 artifact, all relative to the working directory.
    pub fn builtin() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            run_log: PathBuf::from("processing_log.txt"),
            merge: MergeConfig {
                output: PathBuf::from("final_all_news_combined.csv"),
                extra_inputs: vec![PathBuf::from("final_2001-2017_combined.csv")],
                parquet: Some(PathBuf::from("merged_all_news.parquet")),
            },
            sources: vec![
                SourceSchema {
                    name: "1984-2000".into(),
                    path: PathBuf::from("data/1984-2000.xlsx"),
                    format: SourceFormat::Spreadsheet { sheet: 0 },
                    encoding: "utf-8".into(),
                    has_header: false,
                    columns: positional_three(),
                    date: DateStrategy::Fixed {
                        format: "%Y/%m/%d".into(),
                    },
                    dedup: DedupKey::Raw,
                    terminal: Terminal::PerDay,
                    output: PathBuf::from("final_1984-2000_combined.csv"),
                },
                SourceSchema {
                    name: "2018-2024.6".into(),
                    path: PathBuf::from("data/2018-2024.6.csv"),
                    format: SourceFormat::Csv { delimiter: ',' },
                    encoding: "latin1".into(),
                    has_header: false,
                    columns: positional_three(),
                    date: DateStrategy::Ordered {
                        formats: vec!["%d/%m/%Y".into(), "%Y/%m/%d".into()],
                    },
                    dedup: DedupKey::Raw,
                    terminal: Terminal::PerRecord,
                    output: PathBuf::from("final_2018-2024.6_combined.csv"),
                },
                SourceSchema {
                    name: "2022".into(),
                    path: PathBuf::from("data/2022.xlsx"),
                    format: SourceFormat::Spreadsheet { sheet: 0 },
                    encoding: "utf-8".into(),
                    has_header: true,
                    columns: ColumnMap {
                        date: ColumnRef::Name("DATE".into()),
                        title: Some(ColumnRef::Name("TITLE".into())),
                        body: ColumnRef::Name("CONTENT".into()),
                    },
                    date: DateStrategy::DayFirst,
                    dedup: DedupKey::Raw,
                    terminal: Terminal::PerDay,
                    output: PathBuf::from("final_2022_combined.csv"),
                },
                SourceSchema {
                    name: "2024.7-2025.3".into(),
                    path: PathBuf::from("data/结果2024_7_3to2025_3_15.xlsx"),
                    format: SourceFormat::Spreadsheet { sheet: 0 },
                    encoding: "utf-8".into(),
                    has_header: true,
                    columns: ColumnMap {
                        date: ColumnRef::Name("date".into()),
                        title: Some(ColumnRef::Name("title".into())),
                        body: ColumnRef::Name("text".into()),
                    },
                    date: DateStrategy::TokenText {
                        year: "年".into(),
                        month: "月".into(),
                        day: "日".into(),
                    },
                    dedup: DedupKey::Raw,
                    terminal: Terminal::PerRecord,
                    output: PathBuf::from("final_2024.7-2025.3_combined.csv"),
                },
            ],
        }
    }
}

fn positional_three() -> ColumnMap {
    ColumnMap {
        date: ColumnRef::Index(0),
        title: Some(ColumnRef::Index(1)),
        body: ColumnRef::Index(2),
    }
}
