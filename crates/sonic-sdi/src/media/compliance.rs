//! Transceiver compliance codes.
//!
//! The eight compliance bytes (SFP bytes 3-10, QSFP bytes 131-138) pack
//! several independent standards groups into shared bytes. Decoding splits
//! them into one flag set per group. Flag values are group-local and match
//! the SDI compliance masks; reserved bits decode to nothing.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use sdi_types::FormFactor;

macro_rules! compliance_flags {
    ($(#[$doc:meta])* $name:ident: $repr:ty { $($flag:ident = $value:expr;)+ }) => {
        bitflags! {
            $(#[$doc])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
            pub struct $name: $repr {
                $(const $flag = $value;)+
            }
        }
    };
}

compliance_flags! {
    /// SFP 10G Ethernet (byte 3, bits 7-4).
    Sfp10gEthernet: u8 {
        SR = 0x01;
        LR = 0x02;
        LRM = 0x04;
        ER = 0x08;
    }
}

compliance_flags! {
    /// SFP Infiniband (byte 3, bits 3-0).
    SfpInfiniband: u8 {
        COPPER_PASSIVE = 0x01;
        COPPER_ACTIVE = 0x02;
        LX = 0x04;
        SX = 0x08;
    }
}

compliance_flags! {
    /// SFP ESCON (byte 4, bits 7-6).
    SfpEscon: u8 {
        SMF = 0x01;
        MMF = 0x02;
    }
}

compliance_flags! {
    /// SFP SONET (byte 4 bits 5-0, byte 5).
    SfpSonet: u16 {
        OC3_SHORT_REACH = 0x0001;
        OC3_SM_INTERMEDIATE = 0x0002;
        OC3_SM_LONG = 0x0004;
        OC12_SHORT_REACH = 0x0010;
        OC12_SM_INTERMEDIATE = 0x0020;
        OC12_SM_LONG = 0x0040;
        OC48_SHORT_REACH = 0x0100;
        OC48_INTERMEDIATE = 0x0200;
        OC48_LONG = 0x0400;
        REACH_SPECIFIER_BIT2 = 0x0800;
        REACH_SPECIFIER_BIT1 = 0x1000;
        OC192_SHORT_REACH = 0x2000;
    }
}

compliance_flags! {
    /// SFP 1G/100M Ethernet (byte 6).
    Sfp1gEthernet: u8 {
        BASE1000_SX = 0x01;
        BASE1000_LX = 0x02;
        BASE1000_CX = 0x04;
        BASE1000_T = 0x08;
        BASE100_LX = 0x10;
        BASE100_FX = 0x20;
        BASE_BX10 = 0x40;
        BASE_PX = 0x80;
    }
}

compliance_flags! {
    /// SFP Fibre Channel link length (byte 7, bits 7-3).
    SfpFcDistance: u8 {
        MEDIUM = 0x01;
        LONG = 0x02;
        INTERMEDIATE = 0x04;
        SHORT = 0x08;
        VERY_LONG = 0x10;
    }
}

compliance_flags! {
    /// SFP Fibre Channel transmitter technology (byte 7 bits 2-0, byte 8 bits 7-4).
    SfpFcTechnology: u8 {
        LONGWAVE_LL = 0x01;
        SHORTWAVE_SL = 0x02;
        SHORTWAVE_SN = 0x04;
        ELECTRICAL_INTRA = 0x08;
        ELECTRICAL_INTER = 0x10;
        LONGWAVE_LC = 0x20;
        SHORTWAVE_SA = 0x40;
    }
}

compliance_flags! {
    /// SFP+ cable technology (byte 8, bits 3-2).
    SfpCableTechnology: u8 {
        PASSIVE = 0x01;
        ACTIVE = 0x02;
    }
}

compliance_flags! {
    /// SFP Fibre Channel transmission media (byte 9).
    SfpFcMedia: u8 {
        SINGLE_MODE = 0x01;
        MULTI_MODE_50 = 0x04;
        MULTI_MODE_62_5 = 0x08;
        VIDEO_COAX = 0x10;
        MINIATURE_COAX = 0x20;
        TWISTED_PAIR = 0x40;
        TWIN_AXIAL_PAIR = 0x80;
    }
}

compliance_flags! {
    /// Fibre Channel speed (SFP byte 10, QSFP byte 138).
    FcSpeed: u8 {
        MBPS_100 = 0x01;
        MBPS_200 = 0x04;
        MBPS_400 = 0x10;
        MBPS_1600 = 0x20;
        MBPS_800 = 0x40;
        MBPS_1200 = 0x80;
    }
}

compliance_flags! {
    /// QSFP 10/40G Ethernet (byte 131, bits 6-0).
    Qsfp40gEthernet: u8 {
        ACTIVE_CABLE_40G = 0x01;
        LR4_40G = 0x02;
        SR4_40G = 0x04;
        CR4_40G = 0x08;
        SR_10G = 0x10;
        LR_10G = 0x20;
        LRM_10G = 0x40;
    }
}

compliance_flags! {
    /// QSFP SONET (byte 132, bits 3-0).
    QsfpSonet: u8 {
        OC48_SHORT_REACH = 0x01;
        OC48_INTERMEDIATE = 0x02;
        OC48_LONG = 0x04;
        OTN_40G = 0x08;
    }
}

compliance_flags! {
    /// QSFP SAS/SATA (byte 133, bits 7-4).
    QsfpSas: u8 {
        SAS_3G = 0x10;
        SAS_6G = 0x20;
        SAS_12G = 0x40;
        SAS_24G = 0x80;
    }
}

compliance_flags! {
    /// QSFP 1G Ethernet (byte 134, bits 3-0).
    Qsfp1gEthernet: u8 {
        BASE1000_SX = 0x01;
        BASE1000_LX = 0x02;
        BASE1000_CX = 0x04;
        BASE1000_T = 0x08;
    }
}

compliance_flags! {
    /// QSFP Fibre Channel link length (byte 135, bits 7-3).
    QsfpFcDistance: u8 {
        MEDIUM = 0x02;
        LONG = 0x04;
        INTERMEDIATE = 0x08;
        SHORT = 0x10;
        VERY_LONG = 0x20;
    }
}

compliance_flags! {
    /// QSFP Fibre Channel transmitter technology (byte 135 bits 1-0, byte 136 bits 7-4).
    QsfpFcTechnology: u16 {
        LONGWAVE_LL = 0x0010;
        SHORTWAVE_SL = 0x0020;
        SHORTWAVE_SN = 0x0040;
        ELECTRICAL_INTRA = 0x0080;
        ELECTRICAL_INTER = 0x0100;
        LONGWAVE_LC = 0x0200;
    }
}

compliance_flags! {
    /// QSFP Fibre Channel transmission media (byte 137).
    QsfpFcMedia: u8 {
        SINGLE_MODE = 0x01;
        OM3 = 0x02;
        MULTI_MODE_50 = 0x04;
        MULTI_MODE_62_5 = 0x08;
        VIDEO_COAX = 0x10;
        MINIATURE_COAX = 0x20;
        TWISTED_PAIR = 0x40;
        TWIN_AXIAL_PAIR = 0x80;
    }
}

/// Decoded SFP compliance bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SfpCompliance {
    pub eth_10g: Sfp10gEthernet,
    pub infiniband: SfpInfiniband,
    pub escon: SfpEscon,
    pub sonet: SfpSonet,
    pub eth_1g: Sfp1gEthernet,
    pub fc_distance: SfpFcDistance,
    pub fc_technology: SfpFcTechnology,
    pub cable_technology: SfpCableTechnology,
    pub fc_media: SfpFcMedia,
    pub fc_speed: FcSpeed,
}

impl SfpCompliance {
    /// Decodes SFP bytes 3 through 10.
    pub fn decode(codes: &[u8; 8]) -> Self {
        let [b3, b4, b5, b6, b7, b8, b9, b10] = *codes;
        Self {
            eth_10g: Sfp10gEthernet::from_bits_truncate(b3 >> 4),
            infiniband: SfpInfiniband::from_bits_truncate(b3 & 0x0f),
            escon: SfpEscon::from_bits_truncate(b4 >> 6),
            sonet: SfpSonet::from_bits_truncate(u16::from(b4 & 0x3f) << 8 | u16::from(b5)),
            eth_1g: Sfp1gEthernet::from_bits_truncate(b6),
            fc_distance: SfpFcDistance::from_bits_truncate(b7 >> 3),
            fc_technology: SfpFcTechnology::from_bits_truncate((b7 & 0x07) << 4 | b8 >> 4),
            cable_technology: SfpCableTechnology::from_bits_truncate((b8 >> 2) & 0x03),
            fc_media: SfpFcMedia::from_bits_truncate(b9),
            fc_speed: FcSpeed::from_bits_truncate(b10),
        }
    }

    /// Packs the groups back into bytes 3 through 10.
    pub fn encode(&self) -> [u8; 8] {
        let sonet = self.sonet.bits();
        let tech = self.fc_technology.bits();
        [
            self.eth_10g.bits() << 4 | self.infiniband.bits(),
            self.escon.bits() << 6 | (sonet >> 8) as u8,
            sonet as u8,
            self.eth_1g.bits(),
            self.fc_distance.bits() << 3 | tech >> 4,
            (tech & 0x0f) << 4 | self.cable_technology.bits() << 2,
            self.fc_media.bits(),
            self.fc_speed.bits(),
        ]
    }

    fn flag_count(&self) -> u32 {
        self.eth_10g.bits().count_ones()
            + self.infiniband.bits().count_ones()
            + self.escon.bits().count_ones()
            + self.sonet.bits().count_ones()
            + self.eth_1g.bits().count_ones()
            + self.fc_distance.bits().count_ones()
            + self.fc_technology.bits().count_ones()
            + self.cable_technology.bits().count_ones()
            + self.fc_media.bits().count_ones()
            + self.fc_speed.bits().count_ones()
    }

    fn names(&self) -> Vec<String> {
        let mut names = Vec::new();
        push_names(&mut names, "10GbE", self.eth_10g.iter_names());
        push_names(&mut names, "Infiniband", self.infiniband.iter_names());
        push_names(&mut names, "ESCON", self.escon.iter_names());
        push_names(&mut names, "SONET", self.sonet.iter_names());
        push_names(&mut names, "1GbE", self.eth_1g.iter_names());
        push_names(&mut names, "FC length", self.fc_distance.iter_names());
        push_names(&mut names, "FC tech", self.fc_technology.iter_names());
        push_names(&mut names, "Cable", self.cable_technology.iter_names());
        push_names(&mut names, "FC media", self.fc_media.iter_names());
        push_names(&mut names, "FC speed", self.fc_speed.iter_names());
        names
    }
}

/// Decoded QSFP compliance bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QsfpCompliance {
    pub eth_40g: Qsfp40gEthernet,
    pub sonet: QsfpSonet,
    pub sas: QsfpSas,
    pub eth_1g: Qsfp1gEthernet,
    pub fc_distance: QsfpFcDistance,
    pub fc_technology: QsfpFcTechnology,
    pub fc_media: QsfpFcMedia,
    pub fc_speed: FcSpeed,
}

impl QsfpCompliance {
    /// Decodes QSFP bytes 131 through 138.
    pub fn decode(codes: &[u8; 8]) -> Self {
        let [b131, b132, b133, b134, b135, b136, b137, b138] = *codes;
        Self {
            eth_40g: Qsfp40gEthernet::from_bits_truncate(b131),
            sonet: QsfpSonet::from_bits_truncate(b132),
            sas: QsfpSas::from_bits_truncate(b133),
            eth_1g: Qsfp1gEthernet::from_bits_truncate(b134),
            fc_distance: QsfpFcDistance::from_bits_truncate(b135 >> 2),
            fc_technology: QsfpFcTechnology::from_bits_truncate(
                u16::from(b135 & 0x03) << 8 | u16::from(b136),
            ),
            fc_media: QsfpFcMedia::from_bits_truncate(b137),
            fc_speed: FcSpeed::from_bits_truncate(b138),
        }
    }

    /// Packs the groups back into bytes 131 through 138.
    pub fn encode(&self) -> [u8; 8] {
        let tech = self.fc_technology.bits();
        [
            self.eth_40g.bits(),
            self.sonet.bits(),
            self.sas.bits(),
            self.eth_1g.bits(),
            self.fc_distance.bits() << 2 | (tech >> 8) as u8,
            tech as u8,
            self.fc_media.bits(),
            self.fc_speed.bits(),
        ]
    }

    fn flag_count(&self) -> u32 {
        self.eth_40g.bits().count_ones()
            + self.sonet.bits().count_ones()
            + self.sas.bits().count_ones()
            + self.eth_1g.bits().count_ones()
            + self.fc_distance.bits().count_ones()
            + self.fc_technology.bits().count_ones()
            + self.fc_media.bits().count_ones()
            + self.fc_speed.bits().count_ones()
    }

    fn names(&self) -> Vec<String> {
        let mut names = Vec::new();
        push_names(&mut names, "10/40GbE", self.eth_40g.iter_names());
        push_names(&mut names, "SONET", self.sonet.iter_names());
        push_names(&mut names, "SAS", self.sas.iter_names());
        push_names(&mut names, "1GbE", self.eth_1g.iter_names());
        push_names(&mut names, "FC length", self.fc_distance.iter_names());
        push_names(&mut names, "FC tech", self.fc_technology.iter_names());
        push_names(&mut names, "FC media", self.fc_media.iter_names());
        push_names(&mut names, "FC speed", self.fc_speed.iter_names());
        names
    }
}

fn push_names<'a, T>(out: &mut Vec<String>, group: &str, flags: impl Iterator<Item = (&'a str, T)>) {
    out.extend(flags.map(|(name, _)| format!("{} {}", group, name)));
}

/// Compliance descriptor of a module; exactly one family per module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "lowercase")]
pub enum TransceiverDescriptor {
    Sfp(SfpCompliance),
    Qsfp(QsfpCompliance),
}

impl TransceiverDescriptor {
    pub fn decode(form_factor: FormFactor, codes: &[u8; 8]) -> Self {
        match form_factor {
            FormFactor::Sfp => TransceiverDescriptor::Sfp(SfpCompliance::decode(codes)),
            FormFactor::Qsfp => TransceiverDescriptor::Qsfp(QsfpCompliance::decode(codes)),
        }
    }

    pub fn encode(&self) -> [u8; 8] {
        match self {
            TransceiverDescriptor::Sfp(c) => c.encode(),
            TransceiverDescriptor::Qsfp(c) => c.encode(),
        }
    }

    pub fn form_factor(&self) -> FormFactor {
        match self {
            TransceiverDescriptor::Sfp(_) => FormFactor::Sfp,
            TransceiverDescriptor::Qsfp(_) => FormFactor::Qsfp,
        }
    }

    /// Total number of standards flags set across all groups.
    pub fn flag_count(&self) -> u32 {
        match self {
            TransceiverDescriptor::Sfp(c) => c.flag_count(),
            TransceiverDescriptor::Qsfp(c) => c.flag_count(),
        }
    }

    /// Human-readable list of the standards the module complies with.
    pub fn names(&self) -> Vec<String> {
        match self {
            TransceiverDescriptor::Sfp(c) => c.names(),
            TransceiverDescriptor::Qsfp(c) => c.names(),
        }
    }

    /// True for copper 1000BASE-T modules.
    pub fn is_1000base_t(&self) -> bool {
        match self {
            TransceiverDescriptor::Sfp(c) => c.eth_1g.contains(Sfp1gEthernet::BASE1000_T),
            TransceiverDescriptor::Qsfp(c) => c.eth_1g.contains(Qsfp1gEthernet::BASE1000_T),
        }
    }
}
