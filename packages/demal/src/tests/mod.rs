mod combining;
mod emitting;
mod json;

pub use super::*;

/// Parses MAL source that the tests rely on being valid.
pub fn parse(src: &str) -> Document {
    Document::from_mal_str(src).expect("test fixture should parse")
}

/// A full-featured model exercising every construct the parser knows: defines,
/// category and asset metadata, all five attribute kinds, probabilities, CIA
/// annotations, tags, let-bound and positional expressions, inheritance, and
/// associations with multiplicities.
pub const NETWORK_MODEL: &str = r#"// Sample threat model
#id: "com.example.network"
#version: "1.0.0"

category System
  description: "Core infrastructure"
{
  asset Network
    owner: "ops team"
  {
    | access
      description: "Attacker can reach the network"
      -> hosts.connect
  }

  asset Host extends Machine {
    & compromise [Exponential(0.02)] {C,I,A} @hidden
      rationale: "Requires both access and credentials"
      -> let files = disk.read,
         passwords.obtain
    # hardened [Bernoulli(0.5)]
    E backups
      <- backupServer.store
  }

  abstract asset Machine {
    | connect
    !E isolated
      <- peers.reach
  }
}

associations {
  Network [net] 1 <-- Connection --> * [hosts] Host
    description: "Hosts on a network"
  Host [src] * <-- Access --> * [dst] Host
}
"#;
