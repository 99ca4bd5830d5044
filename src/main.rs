//! Command-line interface for xmlschema-grammar

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};

#[cfg(feature = "cli")]
use std::path::{Path, PathBuf};

#[cfg(feature = "cli")]
use xmlschema_grammar::grammar::GrammarSummary;
#[cfg(feature = "cli")]
use xmlschema_grammar::ingest::{ingest_file, IngestReport};
#[cfg(feature = "cli")]
use xmlschema_grammar::{
    Child, ElementDeclIndex, ElementValidator, GrammarPool, GrammarResolver,
    QualifiedName, Scope, SubstitutionResolver, SymbolTable, ValidResult,
};

#[cfg(feature = "cli")]
#[derive(Parser, Debug)]
#[command(name = "xsdgrammar")]
#[command(author, version, about = "XML Schema grammar inspection and content-model checks", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand, Debug)]
enum Commands {
    /// Ingest an XSD schema and display its element declarations
    Inspect {
        /// Path to the XSD schema file
        #[arg(value_name = "SCHEMA")]
        schema: PathBuf,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Validate a child sequence against a global element's content model
    Validate {
        /// Path to the XSD schema file
        #[arg(value_name = "SCHEMA")]
        schema: PathBuf,

        /// Local name of the global element
        #[arg(short, long)]
        element: String,

        /// Comma-separated child names; `#PCDATA` for character data
        #[arg(short, long, value_delimiter = ',')]
        children: Vec<String>,

        /// Character data of a simple-content element
        #[arg(short, long)]
        text: Option<String>,
    },

    /// List what may be inserted at a position in a child sequence
    Insert {
        /// Path to the XSD schema file
        #[arg(value_name = "SCHEMA")]
        schema: PathBuf,

        /// Local name of the global element
        #[arg(short, long)]
        element: String,

        /// Comma-separated child names; `#PCDATA` for character data
        #[arg(short, long, value_delimiter = ',')]
        children: Vec<String>,

        /// Insertion offset (0 = before the first child)
        #[arg(short, long)]
        at: usize,

        /// Require the whole sequence to stay valid after the insertion
        #[arg(long)]
        fully_valid: bool,
    },
}

#[cfg(feature = "cli")]
fn main() {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Inspect { schema, json } => cmd_inspect(&schema, json),
        Commands::Validate {
            schema,
            element,
            children,
            text,
        } => cmd_validate(&schema, &element, &children, text.as_deref()),
        Commands::Insert {
            schema,
            element,
            children,
            at,
            fully_valid,
        } => cmd_insert(&schema, &element, &children, at, fully_valid),
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(feature = "cli")]
type CliResult = Result<bool, Box<dyn std::error::Error>>;

/// Schema loaded for one command
#[cfg(feature = "cli")]
struct Loaded {
    pool: GrammarPool,
    names: SymbolTable,
    report: IngestReport,
}

#[cfg(feature = "cli")]
impl Loaded {
    fn from_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let mut pool = GrammarPool::new();
        let mut names = SymbolTable::new();
        let report = ingest_file(&mut pool, &mut names, path)?;
        for error in &report.errors {
            eprintln!("warning: {}", error);
        }
        Ok(Self { pool, names, report })
    }

    fn namespace(&self) -> &str {
        &self.report.target_namespace
    }

    fn global_element(&self, local: &str) -> Result<ElementDeclIndex, Box<dyn std::error::Error>> {
        let grammar = self
            .pool
            .grammar(self.namespace())
            .ok_or("schema produced no grammar")?;
        QualifiedName::lookup(&self.names, self.namespace(), local)
            .and_then(|name| grammar.element_decl_index(&name, Scope::TopLevel))
            .ok_or_else(|| format!("global element '{}' not found in schema", local).into())
    }

    /// Child names are local names in the target namespace, local names
    /// without a namespace, or Clark notation
    fn children(&mut self, tokens: &[String]) -> Vec<Child> {
        let namespace = self.report.target_namespace.clone();
        tokens
            .iter()
            .map(|token| token.trim())
            .filter(|token| !token.is_empty())
            .map(|token| {
                if token == "#PCDATA" {
                    return Child::PcData;
                }
                if let Some((uri, local)) = token.strip_prefix('{').and_then(|rest| rest.split_once('}')) {
                    return Child::Element(QualifiedName::intern(&mut self.names, uri, local));
                }
                QualifiedName::lookup(&self.names, &namespace, token)
                    .or_else(|| QualifiedName::lookup(&self.names, "", token))
                    .unwrap_or_else(|| QualifiedName::intern(&mut self.names, &namespace, token))
                    .into()
            })
            .collect()
    }
}

#[cfg(feature = "cli")]
fn cmd_inspect(schema_path: &Path, json_output: bool) -> CliResult {
    let loaded = Loaded::from_file(schema_path)?;
    let grammar = loaded
        .pool
        .grammar(loaded.namespace())
        .ok_or("schema produced no grammar")?;
    let summary = GrammarSummary::build(grammar, &loaded.names)?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(loaded.report.is_clean());
    }

    println!("xmlschema-grammar v{}", xmlschema_grammar::VERSION);
    println!();
    println!("Grammar Information:");
    println!(
        "  Target Namespace: {}",
        summary.target_namespace.as_deref().unwrap_or("(none)")
    );
    println!("  Kind: {}", summary.kind);
    println!();
    println!("Statistics:");
    println!("  Global Elements: {}", summary.global_elements());
    println!("  Element Declarations: {}", summary.elements.len());
    println!("  Content-Spec Nodes: {}", summary.content_spec_nodes);
    println!("  Ingestion Errors: {}", loaded.report.errors.len());

    println!("\n=== Element Declarations ===");
    for element in &summary.elements {
        let scope = if element.scope == -1 {
            "global".to_string()
        } else {
            format!("scope {}", element.scope)
        };
        match &element.model {
            Some(model) => println!("  {} ({}) : {} {}", element.name, scope, element.content, model),
            None => println!("  {} ({}) : {}", element.name, scope, element.content),
        }
        if let Some(head) = &element.substitution_group {
            println!("    substitutionGroup: {}", head);
        }
        if !element.attributes.is_empty() {
            println!("    attributes: {}", element.attributes.join(", "));
        }
    }

    Ok(loaded.report.is_clean())
}

#[cfg(feature = "cli")]
fn cmd_validate(schema_path: &Path, element: &str, children: &[String], text: Option<&str>) -> CliResult {
    let mut loaded = Loaded::from_file(schema_path)?;
    let handle = loaded.global_element(element)?;
    let children = loaded.children(children);

    let grammar = loaded
        .pool
        .grammar(loaded.namespace())
        .ok_or("schema produced no grammar")?;
    let resolver = SubstitutionResolver::new(&loaded.pool, &loaded.names);
    let validator = ElementValidator::new(grammar, &loaded.names).with_matcher(&resolver);

    let result = match validator.validate_content(handle, &children, text) {
        Ok(result) => result,
        Err(e) if e.is_datatype() => {
            println!("✗ Content is invalid");
            println!("  {}", e);
            return Ok(false);
        }
        Err(e) => return Err(e.into()),
    };

    match result {
        ValidResult::FullyValid => {
            println!("✓ Content is valid");
            Ok(true)
        }
        ValidResult::ValidPrefix { consumed } => {
            println!("✗ Content is incomplete");
            println!("  all {} children matched but more content is required", consumed);
            Ok(false)
        }
        ValidResult::InvalidAt(index) => {
            println!("✗ Content is invalid");
            let name = children
                .get(index)
                .map(|child| match child {
                    Child::Element(name) => name.display(&loaded.names),
                    Child::PcData => "#PCDATA".to_string(),
                })
                .unwrap_or_else(|| "end of content".to_string());
            println!("  child {} ({}) is not allowed here", index, name);
            Ok(false)
        }
    }
}

#[cfg(feature = "cli")]
fn cmd_insert(
    schema_path: &Path,
    element: &str,
    children: &[String],
    at: usize,
    fully_valid: bool,
) -> CliResult {
    let mut loaded = Loaded::from_file(schema_path)?;
    let handle = loaded.global_element(element)?;
    let children = loaded.children(children);

    let grammar = loaded
        .pool
        .grammar(loaded.namespace())
        .ok_or("schema produced no grammar")?;
    let resolver = SubstitutionResolver::new(&loaded.pool, &loaded.names);
    let validator = ElementValidator::new(grammar, &loaded.names).with_matcher(&resolver);
    let result = validator.what_can_go_here(handle, fully_valid, &children, at)?;

    if let Some(index) = result.failed_index {
        println!("✗ Children before offset {} are invalid at {}", at, index);
        return Ok(false);
    }

    println!("Insertion at {}:", at);
    for candidate in &result.candidates {
        let mark = if candidate.valid { "✓" } else { "✗" };
        println!("  {} {}", mark, candidate.name.display(&loaded.names));
    }
    println!(
        "  end of content: {}",
        if result.is_valid_eoc { "valid" } else { "invalid" }
    );
    println!(
        "  character data: {}",
        if result.can_hold_pcdata { "allowed" } else { "not allowed" }
    );
    Ok(true)
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Rebuild with --features cli");
    std::process::exit(1);
}
