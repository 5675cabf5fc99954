//! Column names shared by the source extracts and the wide outputs.

pub const PERSON_ID: &str = "PERSONID";
pub const LABEL: &str = "POMPE";

pub const GENDER: &str = "GENDER";
pub const NATIONALITY: &str = "NATIONALITY";
pub const BIRTH_DATE: &str = "DOB";
pub const DEATH_DATE: &str = "DOE";
pub const AGE: &str = "AGE";
pub const DEATH: &str = "DEATH";
pub const COUNTRY: &str = "COUNTRY";
pub const CONTINENT: &str = "CONTINENT";
pub const REGION: &str = "REGION";

pub const ENCOUNTER_ID: &str = "ENCNTRID";
pub const DIAGNOSIS_CODE: &str = "ICDCODE";
pub const DIAGNOSIS_DESCRIPTION: &str = "ICDDESCRIPTION";

pub const ORDER_DATE: &str = "ORDERDATE";
pub const ORDER_MNEMONIC: &str = "ORDERMNEMONIC";
pub const ORDER_CATALOG: &str = "ORDERCATALOG";
pub const RESULT_VALUE: &str = "RESULTVALUE";

pub const EVENT_DATETIME: &str = "EVENTDATETIME";
pub const EVENT_NAME: &str = "EVENTNAME";
pub const EVENT_RESULT: &str = "EVENTRESULT";
pub const CLINICAL_BOOKKEEPING: [&str; 3] = ["ORDERID", "CLINICALEVENTID", "TASKASSAY"];

/// File name of the cohort registry written next to the demographic output.
pub const COHORT_FILE: &str = "unique_ids.json";
/// File name of the diagnosis code catalog.
pub const CODE_CATALOG_FILE: &str = "icdcodes.json";
