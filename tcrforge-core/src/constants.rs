// =============================================================================
// Alphabets
// =============================================================================

/// Version string for tcrforge
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The 20 standard amino acids, in the order used by the fallback generator
pub const AMINO_ACIDS: &[u8; 20] = b"ACDEFGHIKLMNPQRSTVWY";

/// Nucleotides accepted by the translator (case-insensitive)
pub const NUCLEOTIDES: &[u8; 4] = b"ACGT";

/// Length of a codon in base pairs
pub const CODON_LENGTH: usize = 3;

// =============================================================================
// Generation
// =============================================================================

/// Translated proteins shorter than this are discarded
pub const MIN_PROTEIN_LENGTH: usize = 5;

/// Seed used when the configured seed is not DNA (encodes "CAS")
pub const DEFAULT_DNA_SEED: &str = "TGCGCCAGC";

/// Protein seed used when the configuration does not name one
pub const DEFAULT_PROTEIN_SEED: &str = "CAS";

/// Default number of protein tokens requested per generation
pub const DEFAULT_PROTEIN_TOKENS: usize = 20;

/// Bases per amino acid when sizing the DNA token budget
pub const DNA_TOKENS_PER_RESIDUE: usize = 3;

/// Lower bound for the DNA token budget sent to the generation endpoint
pub const MIN_DNA_TOKENS: usize = 128;

/// Upper bound on live generation calls per run
pub const MAX_REAL_CALLS: usize = 5;

/// Default Evo2 generation endpoint
pub const DEFAULT_GENERATION_URL: &str =
    "https://health.api.nvidia.com/v1/biology/arc/evo2-40b/generate";

/// Environment variable holding the generation API credential
pub const DEFAULT_API_KEY_ENV: &str = "NVIDIA_API_KEY";

/// Default top-k sampling parameter
pub const DEFAULT_TOP_K: u32 = 4;

/// Default sampling temperature
pub const DEFAULT_TEMPERATURE: f64 = 1.0;

/// Default per-request timeout for the generation endpoint, in seconds
pub const DEFAULT_GENERATION_TIMEOUT_SECS: u64 = 60;

/// Plain fallback: inclusive residue length range
pub const FALLBACK_MIN_LENGTH: usize = 10;
pub const FALLBACK_MAX_LENGTH: usize = 20;

/// Flanked fallback: inclusive core length range between the W/C anchors
pub const FLANKED_CORE_MIN_LENGTH: usize = 16;
pub const FLANKED_CORE_MAX_LENGTH: usize = 22;

/// Anchor residues of the flanked fallback shape
pub const FLANK_START: u8 = b'W';
pub const FLANK_END: u8 = b'C';

// =============================================================================
// Filtering
// =============================================================================

/// GRAVY score above which a candidate is a tonic-signaling risk
pub const DEFAULT_GRAVY_THRESHOLD: f64 = 0.5;

/// Deamidation-prone dipeptides banned when no motif list is configured
pub const DEFAULT_BANNED_MOTIFS: &[&str] = &["NG", "NS"];

// =============================================================================
// Ranking
// =============================================================================

/// Score assigned to a sequence whose PLL computation failed
pub const SENTINEL_SCORE: f64 = -99.9;

/// Default per-request timeout for the masked-scoring endpoint, in seconds
pub const DEFAULT_RANKER_TIMEOUT_SECS: u64 = 30;

/// Start-of-sequence marker in the masked-LM vocabulary
pub const START_TOKEN: &str = "[CLS]";

/// End-of-sequence marker in the masked-LM vocabulary
pub const END_TOKEN: &str = "[SEP]";

/// Mask marker in the masked-LM vocabulary
pub const MASK_TOKEN: &str = "[MASK]";

// =============================================================================
// Export
// =============================================================================

/// Number of top-ranked candidates handed off for docking
pub const DOCKING_TOP_N: usize = 5;

/// Number of top-ranked candidates echoed to the log
pub const LOGGED_TOP_CANDIDATES: usize = 3;

/// Default directory for run artifacts
pub const DEFAULT_RESULTS_DIR: &str = "results";

/// File name of the ranked export inside the results directory
pub const CANDIDATES_FILE: &str = "candidates.csv";

/// Sub-directory holding docking job files
pub const DOCKING_JOBS_DIR: &str = "docking_jobs";

/// Sub-directory the docking tool is pointed at for its output
pub const DOCKING_OUTPUT_DIR: &str = "docking_output";
