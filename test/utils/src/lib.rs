/// A 3D conformer as PubChem returns it for `record_type=3d`.
pub fn sdf_fixture() -> &'static str {
    return r#"2519
  -OEChem-10182612003D

  4  3  0     0  0  0  0  0  0999 V2000
    0.4700    2.5688    0.0006 O   0  0  0  0  0  0  0  0  0  0  0  0
   -3.1271   -0.4436   -0.0003 N   0  0  0  0  0  0  0  0  0  0  0  0
   -0.9686   -1.3125    0.2000 C   0  0  0  0  0  0  0  0  0  0  0  0
    1.0611    1.3130   -0.0006 C   0  0  0  0  0  0  0  0  0  0  0  0
  1  4  2  0  0  0  0
  2  3  1  0  0  0  0
  3  4  1  0  0  0  0
M  END
> <PUBCHEM_COMPOUND_CID>
2519

$$$$"#;
}

/// A 2D record: every z coordinate is zero.
pub fn flat_sdf_fixture() -> &'static str {
    return r#"2519
  -OEChem-10182612002D

  2  1  0     0  0  0  0  0  0999 V2000
    2.5369    0.7500    0.0000 O   0  0  0  0  0  0  0  0  0  0  0  0
    3.4030    0.2500    0.0000 C   0  0  0  0  0  0  0  0  0  0  0  0
  1  2  2  0  0  0  0
M  END
$$$$"#;
}

pub fn pdb_fixture() -> &'static str {
    return r#"HEADER    PLANT PROTEIN                           30-APR-81   1CRN
TITLE     WATER STRUCTURE OF A HYDROPHOBIC PROTEIN AT ATOMIC RESOLUTION.
ATOM      1  N   THR A   1      17.047  14.099   3.625  1.00 13.79           N
ATOM      2  CA  THR A   1      16.967  12.784   4.338  1.00 10.80           C
ATOM      3  C   THR A   1      15.685  12.755   5.133  1.00  9.19           C
END"#;
}

/// Structure prediction output, where the B-factor column carries pLDDT.
pub fn folded_pdb_fixture() -> &'static str {
    return r#"HEADER                                            01-JAN-26
ATOM      1  N   MET A   1      -1.000   2.000   3.000  1.00 80.00           N
ATOM      2  CA  MET A   1      -1.500   2.500   3.500  1.00 90.00           C
ATOM      3  C   MET A   1      -2.000   3.000   4.000  1.00 70.00           C
END"#;
}
