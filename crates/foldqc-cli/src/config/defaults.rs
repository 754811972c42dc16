pub struct DefaultsConfig {
    pub executable: String,
    pub base_args: Vec<String>,
    pub output_root: String,
    pub use_msa_server: bool,
    pub results_prefix: String,
    pub ptm_threshold: f64,
    pub iptm_threshold: f64,
    pub min_pass: usize,
    pub sample_limit: usize,
    pub job_script_extension: String,
    pub submit_command: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            executable: "boltz".to_string(),
            base_args: vec!["predict".to_string()],
            output_root: "output".to_string(),
            use_msa_server: true,
            results_prefix: "boltz_results_".to_string(),
            ptm_threshold: 0.5,
            iptm_threshold: 0.3,
            min_pass: 10,
            sample_limit: 50,
            job_script_extension: "lsf".to_string(),
            submit_command: "bsub <".to_string(),
        }
    }
}
