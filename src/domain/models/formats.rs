#[cfg(test)]
#[path = "formats_test.rs"]
mod tests;

use std::collections::BTreeMap;

/// An SDF block needs a counts line version tag or an `M  END` terminator.
pub fn is_valid_sdf(text: &str) -> bool {
    let text = text.trim();
    if text.is_empty() {
        return false;
    }

    return text.contains("V2000") || text.contains("V3000") || text.contains("M  END");
}

/// True when any atom in the first V2000 block has a non-zero z coordinate.
pub fn has_3d_coordinates(sdf: &str) -> bool {
    let lines = sdf.lines().collect::<Vec<&str>>();
    let Some(counts_idx) = lines.iter().position(|line| return line.contains("V2000")) else {
        return false;
    };

    // Counts and atom lines are fixed width; wide fields can run together.
    let atom_count = record_field(lines[counts_idx], 0, Some(3))
        .parse::<usize>()
        .unwrap_or(0);

    return lines
        .iter()
        .skip(counts_idx + 1)
        .take(atom_count)
        .filter_map(|line| return record_field(line, 20, Some(30)).parse::<f64>().ok())
        .any(|z| return z != 0.0);
}

/// PDB text must carry at least one coordinate record.
pub fn is_valid_pdb(text: &str) -> bool {
    return text
        .lines()
        .any(|line| return line.starts_with("ATOM") || line.starts_with("HETATM"));
}

fn record_field(line: &str, start: usize, end: Option<usize>) -> String {
    let field = match end {
        Some(end) => line.get(start..end.min(line.len())),
        None => line.get(start..),
    };

    return field.unwrap_or_default().trim().to_string();
}

/// Display name of a PDB entry, from its first `TITLE` record or else the
/// classification in `HEADER`.
pub fn pdb_title(pdb: &str) -> Option<String> {
    let title = pdb
        .lines()
        .find(|line| return line.starts_with("TITLE"))
        .map(|line| return record_field(line, 10, None))
        .filter(|e| return !e.is_empty());
    if title.is_some() {
        return title;
    }

    return pdb
        .lines()
        .find(|line| return line.starts_with("HEADER"))
        .map(|line| return record_field(line, 10, Some(50)))
        .filter(|e| return !e.is_empty());
}

/// Mean of the B-factor column over `ATOM` records. Structure prediction
/// services store per-residue pLDDT there.
pub fn mean_plddt(pdb: &str) -> Option<f64> {
    let values = pdb
        .lines()
        .filter(|line| return line.starts_with("ATOM"))
        .filter_map(|line| return line.get(60..66))
        .filter_map(|field| return field.trim().parse::<f64>().ok())
        .collect::<Vec<f64>>();

    if values.is_empty() {
        return None;
    }

    return Some(values.iter().sum::<f64>() / values.len() as f64);
}

fn one_letter_code(residue: &str) -> char {
    match residue {
        "ALA" => return 'A',
        "ARG" => return 'R',
        "ASN" => return 'N',
        "ASP" => return 'D',
        "CYS" => return 'C',
        "GLN" => return 'Q',
        "GLU" => return 'E',
        "GLY" => return 'G',
        "HIS" => return 'H',
        "ILE" => return 'I',
        "LEU" => return 'L',
        "LYS" => return 'K',
        "MET" => return 'M',
        "PHE" => return 'F',
        "PRO" => return 'P',
        "SER" => return 'S',
        "THR" => return 'T',
        "TRP" => return 'W',
        "TYR" => return 'Y',
        "VAL" => return 'V',
        _ => return 'X',
    }
}

/// One-letter amino acid sequence of every chain, concatenated in chain
/// order. `SEQRES` records win; otherwise residues are read from `ATOM`
/// records.
pub fn protein_sequence(pdb: &str) -> String {
    let mut chains: BTreeMap<String, String> = BTreeMap::new();

    for line in pdb.lines().filter(|line| return line.starts_with("SEQRES")) {
        let chain = record_field(line, 11, Some(12));
        let residues = record_field(line, 19, None);
        let sequence = chains.entry(chain).or_default();
        for residue in residues.split_whitespace().filter(|e| return e.len() == 3) {
            sequence.push(one_letter_code(residue));
        }
    }

    if !chains.is_empty() {
        return chains.into_values().collect();
    }

    let mut residues: BTreeMap<(String, i64), char> = BTreeMap::new();
    for line in pdb.lines().filter(|line| return line.starts_with("ATOM")) {
        let name = record_field(line, 17, Some(20));
        let chain = record_field(line, 21, Some(22));
        let Ok(number) = record_field(line, 22, Some(26)).parse::<i64>() else {
            continue;
        };
        residues
            .entry((chain, number))
            .or_insert_with(|| return one_letter_code(&name));
    }

    return residues.into_values().collect();
}
